//! sidm - Smart Image Dataset Manager
//!
//! Runs image files through configured curation processes: rules decide,
//! gated actions transform. This library crate exposes configuration
//! loading and the orchestrator for the binary and for integration tests.

pub mod config;
pub mod processor;

pub use processor::{FileOutcome, ImageProcessor, OutcomeStatus, RunReport, RunSettings};
