//! The Run Log: an explicit, append-only diagnostic sink.
//!
//! A [`RunLog`] is a cheap cloneable handle; every clone appends to the same
//! ordered sequence. The orchestrator, each process, and each capability unit
//! receive a handle at construction time, and reporters read it at the end.

use std::sync::Arc;

use parking_lot::Mutex;

/// Shared append-only sequence of diagnostic strings.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl RunLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry. Also emitted as a `tracing` event.
    pub fn append(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "sidm::run_log", "{}", message);
        self.entries.lock().push(message);
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Take every entry out of the log, leaving it empty for the next
    /// reporter cycle.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Whether any entry contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|e| e.contains(needle))
    }
}
