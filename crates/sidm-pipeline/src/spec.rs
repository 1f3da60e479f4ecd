//! Declarative binding descriptors, as they appear in configuration.

use serde::{Deserialize, Serialize};
use sidm_common::Params;

/// Descriptor for a rule binding. Rules carry no conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Registry identifier of the unit. `file` is accepted for configs that
    /// still name plugin source files.
    #[serde(alias = "file")]
    pub plugin: String,
    /// Binding name, unique among the process's rules.
    pub name: String,
    #[serde(default)]
    pub params: Params,
}

/// Descriptor for an action binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(alias = "file")]
    pub plugin: String,
    /// Binding name, unique among the process's actions.
    pub name: String,
    #[serde(default)]
    pub params: Params,
    /// Rule names that must all be true for this action to run. Empty means
    /// unconditional.
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl RuleSpec {
    pub fn new(plugin: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            name: name.into(),
            params: Params::new(),
        }
    }

    /// Builder: set parameters.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

impl ActionSpec {
    pub fn new(plugin: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            name: name.into(),
            params: Params::new(),
            conditions: Vec::new(),
        }
    }

    /// Builder: set parameters.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Builder: set gating conditions.
    pub fn with_conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }
}
