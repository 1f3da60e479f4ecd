//! Single-file filesystem actions.

use std::path::PathBuf;

use sidm_common::{Metadata, Params, PluginResult, RunLog};
use sidm_pipeline::{Action, Plugin};

use crate::imaging::file_name;

/// Copies each working file into `output_dir` (required), keeping its name.
/// The copies become the new working set.
pub struct CopyFile {
    log: RunLog,
    output_dir: PathBuf,
}

impl CopyFile {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            output_dir: PathBuf::new(),
        }
    }
}

impl Plugin for CopyFile {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.output_dir = params.require_path("output_dir")?;
        self.log.append(format!(
            "Initialized CopyFile with output directory: {}",
            self.output_dir.display()
        ));
        Ok(())
    }
}

impl Action for CopyFile {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;
        let mut copies = Vec::with_capacity(paths.len());
        for path in paths {
            let target = self.output_dir.join(file_name(&path)?);
            std::fs::copy(&path, &target)?;
            self.log.append(format!(
                "Copied {} to {}",
                path.display(),
                target.display()
            ));
            copies.push(target);
        }
        Ok(copies)
    }
}

/// Renames each working file in place by prepending `prefix` (required).
pub struct RenameFile {
    log: RunLog,
    prefix: String,
}

impl RenameFile {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            prefix: String::new(),
        }
    }
}

impl Plugin for RenameFile {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.prefix = params.require_str("prefix")?.to_string();
        self.log
            .append(format!("Initialized RenameFile with prefix: {}", self.prefix));
        Ok(())
    }
}

impl Action for RenameFile {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        let mut renamed = Vec::with_capacity(paths.len());
        for path in paths {
            let mut name = self.prefix.clone();
            name.push_str(&file_name(&path)?.to_string_lossy());
            let target = path.with_file_name(name);
            std::fs::rename(&path, &target)?;
            self.log.append(format!(
                "Renamed {} to {}",
                path.display(),
                target.display()
            ));
            renamed.push(target);
        }
        Ok(renamed)
    }
}

/// Deletes each working file (`dry_run` only logs).
///
/// Removed files leave the working set, which usually empties it. A file
/// that is already gone is logged and dropped. A file that cannot be
/// deleted stays in the working set and the action carries on.
pub struct Remove {
    log: RunLog,
    dry_run: bool,
}

impl Remove {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            dry_run: false,
        }
    }
}

impl Plugin for Remove {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.dry_run = params.get_bool("dry_run", false)?;
        self.log
            .append(format!("Initialized RemoveAction with dry_run: {}", self.dry_run));
        Ok(())
    }
}

impl Action for Remove {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        let mut remaining = Vec::new();
        for path in paths {
            if !path.exists() {
                self.log
                    .append(format!("File not found: {}", path.display()));
                continue;
            }
            if self.dry_run {
                self.log
                    .append(format!("[DRY RUN] Would remove file: {}", path.display()));
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => self
                    .log
                    .append(format!("Removed file: {}", path.display())),
                Err(e) => {
                    self.log
                        .append(format!("Error removing file {}: {}", path.display(), e));
                    remaining.push(path);
                }
            }
        }
        Ok(remaining)
    }
}
