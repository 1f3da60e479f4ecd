//! Free-form binding parameters with typed accessors.
//!
//! Parameters arrive from configuration as an arbitrary mapping and are
//! handed to a unit exactly once, at `initialize`. The accessors turn a
//! present-but-mistyped value into [`PluginError::InvalidParam`] and an
//! absent required one into [`PluginError::MissingParam`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PluginError, PluginResult};

/// Configuration mapping for one binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value, which must be an object (or null).
    pub fn from_json(value: Value) -> PluginResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(PluginError::invalid_param(
                "params",
                format!("expected a mapping, got {other}"),
            )),
        }
    }

    /// Builder: set a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Raw access.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace every top-level string value equal to `placeholder`.
    pub fn replace_placeholder(&mut self, placeholder: &str, replacement: &str) {
        for value in self.0.values_mut() {
            if value.as_str() == Some(placeholder) {
                *value = Value::String(replacement.to_string());
            }
        }
    }

    pub fn get_str(&self, name: &str) -> PluginResult<Option<&str>> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(mistyped(name, "a string", other)),
        }
    }

    pub fn require_str(&self, name: &str) -> PluginResult<&str> {
        self.get_str(name)?
            .ok_or_else(|| PluginError::MissingParam(name.to_string()))
    }

    pub fn get_u64(&self, name: &str) -> PluginResult<Option<u64>> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_u64()
                .map(Some)
                .ok_or_else(|| mistyped(name, "a non-negative integer", v)),
        }
    }

    pub fn require_u64(&self, name: &str) -> PluginResult<u64> {
        self.get_u64(name)?
            .ok_or_else(|| PluginError::MissingParam(name.to_string()))
    }

    pub fn get_f64(&self, name: &str) -> PluginResult<Option<f64>> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| mistyped(name, "a number", v)),
        }
    }

    pub fn require_f64(&self, name: &str) -> PluginResult<f64> {
        self.get_f64(name)?
            .ok_or_else(|| PluginError::MissingParam(name.to_string()))
    }

    /// Boolean flag, `default` when absent.
    pub fn get_bool(&self, name: &str, default: bool) -> PluginResult<bool> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(mistyped(name, "a boolean", other)),
        }
    }

    /// List of strings; a single string is accepted as a one-element list.
    pub fn get_string_list(&self, name: &str) -> PluginResult<Option<Vec<String>>> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| mistyped(name, "a list of strings", item))
                })
                .collect::<PluginResult<Vec<_>>>()
                .map(Some),
            Some(other) => Err(mistyped(name, "a list of strings", other)),
        }
    }

    pub fn get_path(&self, name: &str) -> PluginResult<Option<PathBuf>> {
        Ok(self.get_str(name)?.map(PathBuf::from))
    }

    pub fn require_path(&self, name: &str) -> PluginResult<PathBuf> {
        self.require_str(name).map(PathBuf::from)
    }
}

fn mistyped(name: &str, expected: &str, got: &Value) -> PluginError {
    PluginError::invalid_param(name, format!("expected {expected}, got {got}"))
}
