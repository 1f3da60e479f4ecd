//! Perceptual de-duplication across a run.
//!
//! Each image is reduced to a difference hash: the grayscale image is
//! resized to `(hash_size + 1) x hash_size` and every bit records whether a
//! pixel is brighter than its right-hand neighbour. Two images whose hashes
//! differ in at most `similarity_threshold` bits are duplicates; the first
//! one seen is kept.
//!
//! The table of seen hashes lives in the unit, so one binding de-duplicates
//! across every file of a run.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use sidm_common::{Metadata, Params, PluginError, PluginResult, RunLog};
use sidm_pipeline::{Action, Plugin};

use crate::imaging;

const DEFAULT_HASH_SIZE: u32 = 8;
const DEFAULT_THRESHOLD: u32 = 5;
const REPORT_FILE: &str = "duplicate_images.txt";

/// Difference hash, one bit per comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DHash(Vec<bool>);

impl DHash {
    fn of(path: &Path, hash_size: u32) -> PluginResult<Self> {
        let gray = imaging::open(path)?
            .grayscale()
            .resize_exact(hash_size + 1, hash_size, FilterType::Triangle)
            .to_luma8();
        let mut bits = Vec::with_capacity((hash_size * hash_size) as usize);
        for y in 0..hash_size {
            for x in 0..hash_size {
                bits.push(gray.get_pixel(x, y).0[0] > gray.get_pixel(x + 1, y).0[0]);
            }
        }
        Ok(Self(bits))
    }

    fn distance(&self, other: &Self) -> u32 {
        self.0
            .iter()
            .zip(&other.0)
            .filter(|(a, b)| a != b)
            .count() as u32
    }
}

/// Drops images that look like one already seen in this run.
///
/// Parameters: `hash_size` (default 8), `similarity_threshold` (default 5),
/// `dry_run` (default true: duplicates are reported and dropped from the
/// working set but stay on disk), `output_dir` (optional: where `finalize`
/// writes a plain-text report).
///
/// An image that cannot be hashed is logged and passes through.
pub struct FindDuplicates {
    log: RunLog,
    hash_size: u32,
    threshold: u32,
    dry_run: bool,
    report_dir: Option<PathBuf>,
    seen: Vec<(DHash, PathBuf)>,
    duplicates: Vec<(PathBuf, PathBuf)>,
    removed: usize,
}

impl FindDuplicates {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            hash_size: DEFAULT_HASH_SIZE,
            threshold: DEFAULT_THRESHOLD,
            dry_run: true,
            report_dir: None,
            seen: Vec::new(),
            duplicates: Vec::new(),
            removed: 0,
        }
    }

    fn original_of(&self, hash: &DHash) -> Option<&Path> {
        self.seen
            .iter()
            .find(|(seen, _)| seen.distance(hash) <= self.threshold)
            .map(|(_, path)| path.as_path())
    }

    /// `Some(path)` to keep the file in the working set.
    fn check(&mut self, path: PathBuf) -> PluginResult<Option<PathBuf>> {
        let hash = match DHash::of(&path, self.hash_size) {
            Ok(hash) => hash,
            Err(e) => {
                self.log
                    .append(format!("Error processing {}: {}", path.display(), e));
                return Ok(Some(path));
            }
        };

        let Some(original) = self.original_of(&hash).map(Path::to_path_buf) else {
            self.seen.push((hash, path.clone()));
            return Ok(Some(path));
        };

        if self.dry_run {
            self.log.append(format!(
                "[DRY RUN] Would remove duplicate: {} (matches {})",
                path.display(),
                original.display()
            ));
        } else {
            std::fs::remove_file(&path)?;
            self.removed += 1;
            self.log.append(format!(
                "Removed duplicate: {} (matches {})",
                path.display(),
                original.display()
            ));
        }
        self.duplicates.push((original, path));
        Ok(None)
    }

    fn write_report(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let mut body = String::new();
        for (original, duplicate) in &self.duplicates {
            let _ = writeln!(
                body,
                "Original: {}\nDuplicate: {}\n",
                original.display(),
                duplicate.display()
            );
        }
        let path = dir.join(REPORT_FILE);
        std::fs::write(&path, body)?;
        Ok(path)
    }
}

impl Plugin for FindDuplicates {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        if let Some(size) = params.get_u64("hash_size")? {
            self.hash_size = u32::try_from(size)
                .ok()
                .filter(|s| (2..=64).contains(s))
                .ok_or_else(|| PluginError::invalid_param("hash_size", "expected 2-64"))?;
        }
        if let Some(threshold) = params.get_u64("similarity_threshold")? {
            self.threshold = u32::try_from(threshold).unwrap_or(u32::MAX);
        }
        self.dry_run = params.get_bool("dry_run", true)?;
        self.report_dir = params.get_path("output_dir")?;
        self.log.append(format!(
            "Initialized FindDuplicates with hash_size: {}, similarity_threshold: {}, dry_run: {}",
            self.hash_size, self.threshold, self.dry_run
        ));
        Ok(())
    }

    fn finalize(&mut self) {
        self.log.append("Duplicate Images Summary:");
        let verb = if self.dry_run {
            "Would remove (dry run)"
        } else {
            "Removed"
        };
        for (original, duplicate) in &self.duplicates {
            self.log.append(format!("Original: {}", original.display()));
            self.log.append(format!("Duplicate: {}", duplicate.display()));
            self.log.append(format!("Action: {verb}"));
        }
        self.log
            .append(format!("Total duplicates found: {}", self.duplicates.len()));
        if self.dry_run {
            self.log.append(format!(
                "Total files that would be removed: {}",
                self.duplicates.len()
            ));
        } else {
            self.log
                .append(format!("Total files removed: {}", self.removed));
        }

        if let Some(dir) = &self.report_dir {
            match self.write_report(dir) {
                Ok(path) => self
                    .log
                    .append(format!("Results written to {}", path.display())),
                Err(e) => tracing::warn!("Failed to write duplicate report: {}", e),
            }
        }
    }
}

impl Action for FindDuplicates {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        let mut kept = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(path) = self.check(path)? {
                kept.push(path);
            }
        }
        Ok(kept)
    }
}
