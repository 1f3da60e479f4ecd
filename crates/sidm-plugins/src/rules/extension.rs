//! Rules that look only at the file extension.

use std::path::Path;

use sidm_common::paths::{has_extension, is_image_file};
use sidm_common::{Metadata, Params, PluginResult, RunLog};
use sidm_pipeline::{Plugin, Rule};

/// True when the extension is one of `allowed_formats`, or any common image
/// extension when none are configured.
pub struct IsImage {
    log: RunLog,
    allowed_formats: Option<Vec<String>>,
}

impl IsImage {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            allowed_formats: None,
        }
    }
}

impl Plugin for IsImage {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.allowed_formats = params.get_string_list("allowed_formats")?;
        match &self.allowed_formats {
            Some(formats) => self.log.append(format!(
                "Initialized IsImage with allowed formats: {}",
                formats.join(", ")
            )),
            None => self
                .log
                .append("Initialized IsImage with default image formats"),
        }
        Ok(())
    }
}

impl Rule for IsImage {
    fn apply(&mut self, path: &Path, _metadata: &Metadata) -> PluginResult<bool> {
        let passed = match &self.allowed_formats {
            Some(formats) => has_extension(path, formats),
            None => is_image_file(path),
        };
        tracing::debug!("IsImage: {} - {}", path.display(), verdict(passed));
        Ok(passed)
    }
}

/// True for `.png` files.
pub struct IsPng {
    log: RunLog,
}

impl IsPng {
    pub fn new(log: RunLog) -> Self {
        Self { log }
    }
}

impl Plugin for IsPng {
    fn initialize(&mut self, _params: &Params) -> PluginResult<()> {
        self.log.append("Initialized IsPNG rule");
        Ok(())
    }
}

impl Rule for IsPng {
    fn apply(&mut self, path: &Path, _metadata: &Metadata) -> PluginResult<bool> {
        let passed = has_extension(path, &["png"]);
        tracing::debug!("IsPNG: {} - {}", path.display(), verdict(passed));
        Ok(passed)
    }
}

const DEFAULT_ALLOWED_TYPES: &[&str] = &[".txt", ".pdf", ".docx", ".xlsx"];

/// True when the extension is one of `allowed_types`.
pub struct FileType {
    allowed_types: Vec<String>,
}

impl FileType {
    pub fn new(_log: RunLog) -> Self {
        Self {
            allowed_types: Vec::new(),
        }
    }
}

impl Plugin for FileType {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.allowed_types = params.get_string_list("allowed_types")?.unwrap_or_else(|| {
            DEFAULT_ALLOWED_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect()
        });
        Ok(())
    }
}

impl Rule for FileType {
    fn apply(&mut self, path: &Path, _metadata: &Metadata) -> PluginResult<bool> {
        let allowed = has_extension(path, &self.allowed_types);
        tracing::debug!(
            "Checking file type for {}: {}",
            path.display(),
            if allowed { "allowed" } else { "not allowed" }
        );
        Ok(allowed)
    }
}

pub(crate) fn verdict(passed: bool) -> &'static str {
    if passed {
        "Passed"
    } else {
        "Failed"
    }
}
