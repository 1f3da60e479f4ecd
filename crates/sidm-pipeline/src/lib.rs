//! # sidm-pipeline
//!
//! Rule-gated curation processes.
//!
//! This crate provides:
//!
//! - **[`Rule`], [`Action`], [`SourceAction`]** -- capability contracts a
//!   unit implements, on top of the shared [`Plugin`] lifecycle.
//! - **[`PluginRegistry`]** -- stable identifiers mapped to unit factories;
//!   every resolution builds a fresh instance.
//! - **[`RuleSpec`] / [`ActionSpec`]** -- declarative binding descriptors as
//!   read from configuration.
//! - **[`Process`]** -- an ordered set of rule and action bindings, evaluated
//!   in two phases: all rules, then the actions whose conditions hold.

pub mod outcome;
pub mod plugin;
pub mod process;
pub mod registry;
pub mod spec;

// Re-export key types at the crate root.
pub use outcome::{RuleOutcome, RuleResults};
pub use plugin::{Action, ActionUnit, Plugin, Rule, SourceAction};
pub use process::{ActionBinding, Process, ProcessBuilder};
pub use registry::{normalize_id, PluginRegistry};
pub use spec::{ActionSpec, RuleSpec};
