//! Rules over pixel dimensions, read from the image header.

use std::path::Path;

use sidm_common::{Metadata, Params, PluginResult, RunLog};
use sidm_pipeline::{Plugin, Rule};

use super::extension::verdict;
use crate::imaging;

/// True when the image is at least `min_width` x `min_height` (both required).
pub struct CheckDimensions {
    log: RunLog,
    min_width: u64,
    min_height: u64,
}

impl CheckDimensions {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            min_width: 0,
            min_height: 0,
        }
    }
}

impl Plugin for CheckDimensions {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.min_width = params.require_u64("min_width")?;
        self.min_height = params.require_u64("min_height")?;
        self.log.append(format!(
            "Initialized CheckDimensions with minimum dimensions: {}x{}",
            self.min_width, self.min_height
        ));
        Ok(())
    }
}

impl Rule for CheckDimensions {
    fn apply(&mut self, path: &Path, _metadata: &Metadata) -> PluginResult<bool> {
        let (width, height) = imaging::dimensions(path)?;
        let passed = u64::from(width) >= self.min_width && u64::from(height) >= self.min_height;
        tracing::debug!(
            "CheckDimensions: {} ({}x{}) - {}",
            path.display(),
            width,
            height,
            verdict(passed)
        );
        Ok(passed)
    }
}

const DEFAULT_SMALL_EDGE: u64 = 100;

/// True when either edge is below `min_width` / `min_height` (default 100).
pub struct IsSmallImage {
    log: RunLog,
    min_width: u64,
    min_height: u64,
}

impl IsSmallImage {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            min_width: DEFAULT_SMALL_EDGE,
            min_height: DEFAULT_SMALL_EDGE,
        }
    }
}

impl Plugin for IsSmallImage {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.min_width = params.get_u64("min_width")?.unwrap_or(DEFAULT_SMALL_EDGE);
        self.min_height = params.get_u64("min_height")?.unwrap_or(DEFAULT_SMALL_EDGE);
        self.log.append(format!(
            "Initialized IsSmallImage with min_width: {}, min_height: {}",
            self.min_width, self.min_height
        ));
        Ok(())
    }
}

impl Rule for IsSmallImage {
    fn apply(&mut self, path: &Path, _metadata: &Metadata) -> PluginResult<bool> {
        let (width, height) = imaging::dimensions(path)?;
        let small = u64::from(width) < self.min_width || u64::from(height) < self.min_height;
        tracing::debug!(
            "IsSmallImage for {}: {}",
            path.display(),
            if small { "Small" } else { "Not small" }
        );
        Ok(small)
    }
}
