//! Sidm-Common: shared types and utilities for the curation engine.
//!
//! This crate provides the pieces every other sidm crate depends on:
//!
//! - **Error Handling**: the engine-wide [`Error`] taxonomy and the
//!   [`PluginError`] that capability units report
//! - **Metadata**: read-only file attributes computed once per discovered file
//! - **Run Log**: the explicit, append-only diagnostic sink shared by a run
//! - **Params**: free-form binding configuration with typed accessors
//! - **Path Utilities**: extension helpers for image candidates
//!
//! # Examples
//!
//! ```
//! use sidm_common::{Params, RunLog};
//! use sidm_common::paths::is_image_file;
//! use std::path::Path;
//!
//! let log = RunLog::new();
//! log.append("Running process: portraits");
//! assert_eq!(log.len(), 1);
//!
//! let params = Params::from_json(serde_json::json!({ "max_size": 1024 })).unwrap();
//! assert_eq!(params.require_u64("max_size").unwrap(), 1024);
//!
//! assert!(is_image_file(Path::new("cat.png")));
//! ```

pub mod error;
pub mod metadata;
pub mod params;
pub mod paths;
pub mod run_log;

pub use error::{Capability, Error, PluginError, PluginResult, Result};
pub use metadata::Metadata;
pub use params::Params;
pub use run_log::RunLog;
