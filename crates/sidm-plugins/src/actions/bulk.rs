//! Many-to-many copy and move into a target directory.

use std::path::{Path, PathBuf};

use sidm_common::{Metadata, Params, PluginError, PluginResult, RunLog};
use sidm_pipeline::{Action, Plugin};

use crate::imaging::file_name;

fn target_for(dir: &Path, path: &Path) -> PluginResult<PathBuf> {
    Ok(dir.join(file_name(path)?))
}

/// Copies every working file into `target_dir` (default `./copied_images`).
///
/// Returns the copies. With `dry_run` nothing is written and the working set
/// passes through unchanged.
pub struct CopyFiles {
    log: RunLog,
    target_dir: PathBuf,
    dry_run: bool,
}

impl CopyFiles {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            target_dir: PathBuf::from("./copied_images"),
            dry_run: false,
        }
    }
}

impl Plugin for CopyFiles {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        if let Some(dir) = params.get_path("target_dir")? {
            self.target_dir = dir;
        }
        self.dry_run = params.get_bool("dry_run", false)?;
        Ok(())
    }
}

impl Action for CopyFiles {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        if !self.dry_run {
            std::fs::create_dir_all(&self.target_dir)?;
        }

        let mut copied = Vec::with_capacity(paths.len());
        for path in paths {
            let target = target_for(&self.target_dir, &path)?;
            if self.dry_run {
                self.log.append(format!(
                    "Dry run: {} would be copied to {}",
                    path.display(),
                    target.display()
                ));
                copied.push(path);
                continue;
            }

            tracing::debug!("Copying file: {} to {}", path.display(), target.display());
            std::fs::copy(&path, &target)?;
            if !target.exists() {
                return Err(PluginError::failed(format!(
                    "Failed to copy {} to {}",
                    path.display(),
                    target.display()
                )));
            }
            copied.push(target);
        }
        Ok(copied)
    }
}

/// Moves every working file into `target_dir` (default `./moved_images`).
///
/// Returns the new locations. `dry_run` reports the locations the files
/// would have, without touching them.
pub struct MoveFiles {
    log: RunLog,
    target_dir: PathBuf,
    dry_run: bool,
}

impl MoveFiles {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            target_dir: PathBuf::from("./moved_images"),
            dry_run: false,
        }
    }
}

impl Plugin for MoveFiles {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        if let Some(dir) = params.get_path("target_dir")? {
            self.target_dir = dir;
        }
        self.dry_run = params.get_bool("dry_run", false)?;
        Ok(())
    }
}

impl Action for MoveFiles {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        let mut moved = Vec::with_capacity(paths.len());
        for path in paths {
            let target = target_for(&self.target_dir, &path)?;
            if self.dry_run {
                self.log.append(format!(
                    "Dry run: {} would be moved to {}",
                    path.display(),
                    target.display()
                ));
                moved.push(target);
                continue;
            }

            std::fs::create_dir_all(&self.target_dir)?;
            move_file(&path, &target)?;
            self.log
                .append(format!("File successfully moved to {}", target.display()));
            moved.push(target);
        }
        Ok(moved)
    }
}

/// `rename`, falling back to copy-then-delete across filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) if from.is_file() => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}
