use std::path::{Path, PathBuf};

use image::ImageReader;
use serde_json::json;
use sidm_common::{Metadata, Params, PluginError, PluginResult, RunLog};
use sidm_pipeline::{Action, Plugin};

use crate::imaging;

/// Writes `<stem>_metadata.json` next to each image: dimensions, detected
/// format, color type, size and a SHA-256 of the content.
///
/// The sidecar is a by-product; the working set passes through unchanged.
pub struct ExtractMetadata {
    log: RunLog,
}

impl ExtractMetadata {
    pub fn new(log: RunLog) -> Self {
        Self { log }
    }

    fn describe(path: &Path, metadata: &Metadata) -> PluginResult<serde_json::Value> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format().map(|f| format!("{f:?}").to_uppercase());
        let img = reader
            .decode()
            .map_err(|e| PluginError::image(format!("{}: {e}", path.display())))?;

        Ok(json!({
            "filename": metadata.filename,
            "size": std::fs::metadata(path)?.len(),
            "modified": metadata.modified,
            "width": img.width(),
            "height": img.height(),
            "format": format,
            "color": format!("{:?}", img.color()),
            "sha256": imaging::sha256_file(path)?,
        }))
    }
}

impl Plugin for ExtractMetadata {
    fn initialize(&mut self, _params: &Params) -> PluginResult<()> {
        self.log.append("Initialized ExtractMetadata");
        Ok(())
    }
}

impl Action for ExtractMetadata {
    fn execute(&mut self, paths: Vec<PathBuf>, metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        for path in &paths {
            let record = Self::describe(path, metadata)?;
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let sidecar = imaging::sibling(dir, path, "_metadata", "json");
            std::fs::write(&sidecar, serde_json::to_string_pretty(&record)?)?;
            self.log.append(format!(
                "Extracted metadata from {} to {}",
                path.display(),
                sidecar.display()
            ));
        }
        Ok(paths)
    }
}
