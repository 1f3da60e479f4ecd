//! Capability contracts implemented by rule and action units.
//!
//! Every unit is a [`Plugin`] (initialized once with its parameters) and
//! additionally one of:
//!
//! - [`Rule`]: a predicate over a file path and its metadata.
//! - [`Action`]: a transform from the current working set to the next one.
//! - [`SourceAction`]: a generator that produces artifacts from configuration
//!   alone and takes no input path.
//!
//! Units are stateful (a loaded model, a hash table accumulated across
//! files) and designed for sequential use; methods take `&mut self`.

use std::path::PathBuf;

use sidm_common::{Metadata, Params, PluginResult};

/// Lifecycle shared by all units.
pub trait Plugin: Send {
    /// Configure the unit. Called exactly once, before any other method.
    fn initialize(&mut self, params: &Params) -> PluginResult<()>;

    /// Called once at the end of a run. Stateful units use this to report a
    /// summary into the run log. Default is a no-op.
    fn finalize(&mut self) {}
}

/// A named predicate over a file.
///
/// May keep internal state across calls, but must not mutate the metadata
/// or delete the artifact.
pub trait Rule: Plugin {
    fn apply(&mut self, path: &std::path::Path, metadata: &Metadata) -> PluginResult<bool>;
}

/// A side-effecting transform of the working set.
///
/// Receives the current working paths and returns the next ones. Returning
/// an empty set means the artifact no longer exists.
pub trait Action: Plugin {
    fn execute(&mut self, paths: Vec<PathBuf>, metadata: &Metadata) -> PluginResult<Vec<PathBuf>>;
}

/// A pure-generation action: produces new artifacts without an input path.
pub trait SourceAction: Plugin {
    fn generate(&mut self, metadata: &Metadata) -> PluginResult<Vec<PathBuf>>;
}

/// An action unit of either variant.
pub enum ActionUnit {
    /// Consumes and produces working paths.
    Transform(Box<dyn Action>),
    /// Ignores the working set and replaces it with generated paths.
    Source(Box<dyn SourceAction>),
}

impl ActionUnit {
    pub(crate) fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        match self {
            ActionUnit::Transform(unit) => unit.initialize(params),
            ActionUnit::Source(unit) => unit.initialize(params),
        }
    }

    pub(crate) fn finalize(&mut self) {
        match self {
            ActionUnit::Transform(unit) => unit.finalize(),
            ActionUnit::Source(unit) => unit.finalize(),
        }
    }

    /// Whether this is a generation action.
    pub fn is_source(&self) -> bool {
        matches!(self, ActionUnit::Source(_))
    }
}

impl std::fmt::Debug for ActionUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionUnit::Transform(_) => f.write_str("ActionUnit::Transform"),
            ActionUnit::Source(_) => f.write_str("ActionUnit::Source"),
        }
    }
}
