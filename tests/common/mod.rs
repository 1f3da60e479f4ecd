//! Shared helpers for integration tests.
//!
//! Provides scratch image trees on disk and a small set of fake units whose
//! behavior is scripted by the test, so the orchestrator can be exercised
//! without decoding anything.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgb, RgbImage};
use sidm_common::{Metadata, Params, PluginError, PluginResult};
use sidm_pipeline::{Action, ActionUnit, Plugin, Rule};

/// Write a solid-color image; the format follows the extension.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(width, height, Rgb([90, 140, 200]))
        .save(&path)
        .unwrap();
    path
}

/// Write a non-image file.
pub fn write_text(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, b"not an image").unwrap();
    path
}

/// A shared call counter.
pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

// ---------------------------------------------------------------------------
// Fake rules
// ---------------------------------------------------------------------------

/// How a [`Scripted`] rule answers.
#[derive(Clone, Copy)]
pub enum Answer {
    Always(bool),
    Fail,
    /// True when the file name contains the needle.
    NameContains(&'static str),
}

pub struct Scripted {
    answer: Answer,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    pub fn boxed(answer: Answer, calls: &Arc<AtomicUsize>) -> Box<dyn Rule> {
        Box::new(Self {
            answer,
            calls: calls.clone(),
        })
    }
}

impl Plugin for Scripted {
    fn initialize(&mut self, _params: &Params) -> PluginResult<()> {
        Ok(())
    }
}

impl Rule for Scripted {
    fn apply(&mut self, path: &Path, _metadata: &Metadata) -> PluginResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answer {
            Answer::Always(v) => Ok(v),
            Answer::Fail => Err(PluginError::failed("classifier unavailable")),
            Answer::NameContains(needle) => Ok(path
                .file_name()
                .map(|n| n.to_string_lossy().contains(needle))
                .unwrap_or(false)),
        }
    }
}

// ---------------------------------------------------------------------------
// Fake actions
// ---------------------------------------------------------------------------

/// Records every path it sees and maps each to `<path><suffix>`.
pub struct Tag {
    suffix: &'static str,
    calls: Arc<AtomicUsize>,
    finalized: Arc<AtomicUsize>,
}

impl Tag {
    pub fn unit(suffix: &'static str, calls: &Arc<AtomicUsize>) -> ActionUnit {
        Self::with_finalize(suffix, calls, &counter())
    }

    pub fn with_finalize(
        suffix: &'static str,
        calls: &Arc<AtomicUsize>,
        finalized: &Arc<AtomicUsize>,
    ) -> ActionUnit {
        ActionUnit::Transform(Box::new(Self {
            suffix,
            calls: calls.clone(),
            finalized: finalized.clone(),
        }))
    }
}

impl Plugin for Tag {
    fn initialize(&mut self, _params: &Params) -> PluginResult<()> {
        Ok(())
    }

    fn finalize(&mut self) {
        self.finalized.fetch_add(1, Ordering::SeqCst);
    }
}

impl Action for Tag {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(paths
            .into_iter()
            .map(|p| PathBuf::from(format!("{}{}", p.display(), self.suffix)))
            .collect())
    }
}

/// Fails for files whose name contains the needle; passes the rest through.
pub struct FailOn {
    needle: &'static str,
    calls: Arc<AtomicUsize>,
}

impl FailOn {
    pub fn unit(needle: &'static str, calls: &Arc<AtomicUsize>) -> ActionUnit {
        ActionUnit::Transform(Box::new(Self {
            needle,
            calls: calls.clone(),
        }))
    }
}

impl Plugin for FailOn {
    fn initialize(&mut self, _params: &Params) -> PluginResult<()> {
        Ok(())
    }
}

impl Action for FailOn {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hit = paths.iter().any(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().contains(self.needle))
                .unwrap_or(false)
        });
        if hit {
            Err(PluginError::failed("write failed"))
        } else {
            Ok(paths)
        }
    }
}

/// Consumes the working set.
pub struct Discard;

impl Discard {
    pub fn unit() -> ActionUnit {
        ActionUnit::Transform(Box::new(Self))
    }
}

impl Plugin for Discard {
    fn initialize(&mut self, _params: &Params) -> PluginResult<()> {
        Ok(())
    }
}

impl Action for Discard {
    fn execute(&mut self, _paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}
