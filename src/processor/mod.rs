//! The orchestrator: owns configured processes and drives discovered files
//! through them under the run's failure policy.

mod report;
mod scan;

pub use report::{FileOutcome, OutcomeStatus, RunReport};
pub use scan::discover;

use crate::config::{Config, GeneralConfig};
use sidm_common::error::display_paths;
use sidm_common::{Error, Metadata, Result, RunLog};
use sidm_pipeline::{PluginRegistry, Process};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Run-level policy.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub recursive: bool,
    pub stop_on_error: bool,
    /// Extension filter applied during discovery; empty keeps every file.
    pub extensions: Vec<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from(&GeneralConfig::default())
    }
}

impl From<&GeneralConfig> for RunSettings {
    fn from(general: &GeneralConfig) -> Self {
        Self {
            recursive: general.recursive,
            stop_on_error: general.stop_on_error,
            extensions: general.extensions.clone(),
        }
    }
}

/// Drives files through one or more processes.
pub struct ImageProcessor {
    processes: BTreeMap<String, Process>,
    settings: RunSettings,
    log: RunLog,
}

impl ImageProcessor {
    /// Build every configured process. Any load-time failure is fatal.
    pub fn new(config: &Config, registry: &PluginRegistry, log: RunLog) -> Result<Self> {
        let mut processes = BTreeMap::new();
        for (name, process) in &config.processes {
            let built = Process::from_specs(name, &process.rules, &process.actions, registry, &log)?;
            debug!("Loaded process '{}': {:?}", name, built);
            processes.insert(name.clone(), built);
        }
        Ok(Self {
            processes,
            settings: RunSettings::from(&config.general),
            log,
        })
    }

    /// Assemble from already-built processes.
    pub fn from_processes(
        processes: impl IntoIterator<Item = Process>,
        settings: RunSettings,
        log: RunLog,
    ) -> Self {
        Self {
            processes: processes
                .into_iter()
                .map(|p| (p.name().to_string(), p))
                .collect(),
            settings,
            log,
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn process_names(&self) -> Vec<&str> {
        self.processes.keys().map(String::as_str).collect()
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    /// Run one process over every candidate file under `source`.
    pub fn run_process(&mut self, name: &str, source: &Path) -> Result<RunReport> {
        self.run_processes(&[name], source)
    }

    /// Run several processes, in the given order, over every candidate file.
    ///
    /// Each process sees the working paths left by the previous one and
    /// evaluates its rules afresh for each of them. Metadata is computed
    /// once per discovered file and shared by all processes.
    ///
    /// # Errors
    ///
    /// Unknown process names and a missing source directory fail before any
    /// file is scanned. With `stop_on_error`, the first per-file error ends
    /// the run as [`Error::RunAborted`].
    pub fn run_processes<S: AsRef<str>>(&mut self, names: &[S], source: &Path) -> Result<RunReport> {
        let mut order: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name: &str = name.as_ref();
            if !self.processes.contains_key(name) {
                self.log
                    .append(format!("Error: Process '{}' not found.", name));
                return Err(Error::UnknownProcess(name.to_string()));
            }
            if !order.iter().any(|n| n == name) {
                order.push(name.to_string());
            }
        }
        if order.is_empty() {
            return Err(Error::config("no process selected for the run"));
        }
        if !source.is_dir() {
            return Err(Error::SourceNotFound(source.to_path_buf()));
        }

        for name in &order {
            self.log.append(format!("Running process: {}", name));
        }

        let files = discover(source, self.settings.recursive, &self.settings.extensions);
        info!(
            "Processing {} files from {:?} with {}",
            files.len(),
            source,
            order.join(" -> ")
        );

        let mut report = RunReport::default();
        let result = self.run_files(&files, &order, &mut report);

        for name in &order {
            if let Some(process) = self.processes.get_mut(name) {
                process.finalize();
            }
        }

        result.map(|()| {
            info!("{}", report);
            report
        })
    }

    fn run_files(&mut self, files: &[PathBuf], order: &[String], report: &mut RunReport) -> Result<()> {
        for file in files {
            report.attempted += 1;
            if let Err((process, e)) = self.run_file(file, order, report) {
                self.log
                    .append(format!("Error processing {}: {}", file.display(), e));
                report.record(file, &process, OutcomeStatus::Failed(e.to_string()));

                if self.settings.stop_on_error {
                    self.log.append("Stopping process due to error.");
                    self.log.append("Processing stopped due to an error.");
                    return Err(Error::RunAborted {
                        path: file.clone(),
                        source: Box::new(e),
                    });
                }
                self.log.append("Continuing to next image...");
            }
        }
        Ok(())
    }

    /// Drive one discovered file through every process in `order`.
    ///
    /// On failure, returns the name of the process that was running.
    fn run_file(
        &mut self,
        file: &Path,
        order: &[String],
        report: &mut RunReport,
    ) -> std::result::Result<(), (String, Error)> {
        let metadata = Metadata::from_path(file).map_err(|e| (order[0].clone(), Error::Io(e)))?;
        let mut working = vec![file.to_path_buf()];

        for name in order {
            if working.is_empty() {
                debug!("{:?} no longer exists; skipping process '{}'", file, name);
                break;
            }
            let Some(process) = self.processes.get_mut(name) else {
                continue;
            };

            let mut next = Vec::with_capacity(working.len());
            let mut applied = false;
            for path in working {
                let results = process.apply(&path, &metadata);
                if !results.any_true() {
                    self.log.append(format!(
                        "Skipped process '{}' for {}",
                        name,
                        path.display()
                    ));
                    next.push(path);
                    continue;
                }

                let out = process
                    .execute(vec![path], &metadata, &results)
                    .map_err(|e| (name.clone(), e))?;
                applied = true;
                next.extend(out);
            }

            if applied {
                self.log.append(format!(
                    "Applied process '{}' to {}",
                    name,
                    display_paths(&next)
                ));
                report.record(file, name, OutcomeStatus::Applied(next.clone()));
            } else {
                report.record(file, name, OutcomeStatus::Skipped);
            }
            working = next;
        }

        Ok(())
    }
}

impl std::fmt::Debug for ImageProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageProcessor")
            .field("processes", &self.process_names())
            .field("settings", &self.settings)
            .finish()
    }
}
