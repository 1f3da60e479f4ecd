//! Per-run outcome records.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened to one file under one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// At least one rule held; the action phase returned these paths.
    Applied(Vec<PathBuf>),
    /// No rule held; nothing ran.
    Skipped,
    /// An error surfaced while processing the file.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    /// The discovered file.
    pub source: PathBuf,
    pub process: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// Summary of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Number of discovered files that were attempted.
    pub attempted: usize,
    /// Outcomes in processing order.
    pub outcomes: Vec<FileOutcome>,
}

impl RunReport {
    pub(crate) fn record(&mut self, source: &Path, process: &str, status: OutcomeStatus) {
        self.outcomes.push(FileOutcome {
            source: source.to_path_buf(),
            process: process.to_string(),
            status,
        });
    }

    pub fn applied(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Applied(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    /// Outcome for a discovered file under a process.
    pub fn outcome(&self, source: &Path, process: &str) -> Option<&OutcomeStatus> {
        self.outcomes
            .iter()
            .find(|o| o.source == source && o.process == process)
            .map(|o| &o.status)
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files attempted: {} applied, {} skipped, {} failed",
            self.attempted,
            self.applied(),
            self.skipped(),
            self.failed()
        )
    }
}
