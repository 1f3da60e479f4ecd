//! Per-file metadata computed once before any rule or action sees the file.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only attributes of a discovered file.
///
/// Computed once per file by the orchestrator and shared with every rule and
/// action of every process applied to that file. Units that need facts about
/// their own output must recompute them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Base filename of the discovered file.
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// Lowercase extension without the dot, if any.
    pub extension: Option<String>,
    /// Last modification time, when the platform reports one.
    pub modified: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Stat `path` and derive its metadata.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let stat = std::fs::metadata(path)?;
        Ok(Self {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: stat.len(),
            extension: crate::paths::extension_of(path),
            modified: stat.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    /// Metadata for a file that does not exist on disk (generation actions,
    /// tests).
    pub fn synthetic(filename: impl Into<String>, size: u64) -> Self {
        let filename = filename.into();
        let extension = crate::paths::extension_of(Path::new(&filename));
        Self {
            filename,
            size,
            extension,
            modified: None,
        }
    }
}
