//! File-size rules.

use std::path::Path;

use sidm_common::{Metadata, Params, PluginResult, RunLog};
use sidm_pipeline::{Plugin, Rule};

use super::extension::verdict;

/// True when the discovered size (from metadata) is at most `max_size` bytes.
pub struct CheckFileSize {
    log: RunLog,
    max_size: u64,
}

impl CheckFileSize {
    pub fn new(log: RunLog) -> Self {
        Self { log, max_size: 0 }
    }
}

impl Plugin for CheckFileSize {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.max_size = params.require_u64("max_size")?;
        self.log.append(format!(
            "Initialized CheckFileSize with max size: {} bytes",
            self.max_size
        ));
        Ok(())
    }
}

impl Rule for CheckFileSize {
    fn apply(&mut self, path: &Path, metadata: &Metadata) -> PluginResult<bool> {
        let passed = metadata.size <= self.max_size;
        tracing::debug!(
            "CheckFileSize: {} ({} bytes) - {}",
            path.display(),
            metadata.size,
            verdict(passed)
        );
        Ok(passed)
    }
}

const DEFAULT_MAX_SIZE: u64 = 1024 * 1024;

/// True when the file on disk is at most `max_size` bytes (default 1 MiB).
///
/// Stats the path itself, so it sees changes made by earlier processes.
pub struct FileSize {
    max_size: u64,
}

impl FileSize {
    pub fn new(_log: RunLog) -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl Plugin for FileSize {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.max_size = params.get_u64("max_size")?.unwrap_or(DEFAULT_MAX_SIZE);
        Ok(())
    }
}

impl Rule for FileSize {
    fn apply(&mut self, path: &Path, _metadata: &Metadata) -> PluginResult<bool> {
        let size = std::fs::metadata(path)?.len();
        tracing::debug!("Checking filesize for {}: {} bytes", path.display(), size);
        Ok(size <= self.max_size)
    }
}
