use std::path::Path;

use chrono::{DateTime, Utc};
use sidm_common::{Metadata, Params, PluginError, PluginResult, RunLog};
use sidm_pipeline::{Plugin, Rule};

use super::extension::verdict;

const SECONDS_PER_DAY: i64 = 86_400;

/// True when the file was last modified at most `max_age_days` ago.
///
/// Uses the modification time captured in metadata, falling back to the
/// file itself when the platform did not report one at discovery.
pub struct CheckCreationDate {
    log: RunLog,
    max_age_days: u64,
}

impl CheckCreationDate {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            max_age_days: 0,
        }
    }

    fn is_fresh(&self, modified: DateTime<Utc>, now: DateTime<Utc>) -> (bool, i64) {
        let age = (now - modified).num_seconds();
        let limit = i64::try_from(self.max_age_days)
            .unwrap_or(i64::MAX)
            .saturating_mul(SECONDS_PER_DAY);
        (age <= limit, age / SECONDS_PER_DAY)
    }
}

impl Plugin for CheckCreationDate {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.max_age_days = params.require_u64("max_age_days")?;
        self.log.append(format!(
            "Initialized CheckCreationDate with max age: {} days",
            self.max_age_days
        ));
        Ok(())
    }
}

impl Rule for CheckCreationDate {
    fn apply(&mut self, path: &Path, metadata: &Metadata) -> PluginResult<bool> {
        let modified = match metadata.modified {
            Some(ts) => ts,
            None => std::fs::metadata(path)?
                .modified()
                .map(DateTime::<Utc>::from)
                .map_err(|e| {
                    PluginError::failed(format!("{}: no modification time: {e}", path.display()))
                })?,
        };
        let (passed, days) = self.is_fresh(modified, Utc::now());
        tracing::debug!(
            "CheckCreationDate: {} (Age: {} days) - {}",
            path.display(),
            days,
            verdict(passed)
        );
        Ok(passed)
    }
}
