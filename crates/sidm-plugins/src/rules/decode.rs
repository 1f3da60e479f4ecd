use std::path::Path;

use image::ImageReader;
use sidm_common::paths::has_extension;
use sidm_common::{Metadata, Params, PluginResult, RunLog};
use sidm_pipeline::{Plugin, Rule};

const DEFAULT_FORMATS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// True when the file's content is a readable image and its extension is
/// one of `allowed_formats` (default `.jpg`, `.jpeg`, `.png`).
///
/// Unlike `rules/is_image` this sniffs the header, so a text file renamed to
/// `.png` fails. Unreadable content is a plain `false`, not an error.
pub struct DecodableImage {
    log: RunLog,
    allowed_formats: Vec<String>,
}

impl DecodableImage {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            allowed_formats: Vec::new(),
        }
    }

    fn verify(path: &Path) -> Result<(), String> {
        ImageReader::open(path)
            .map_err(|e| e.to_string())?
            .with_guessed_format()
            .map_err(|e| e.to_string())?
            .into_dimensions()
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

impl Plugin for DecodableImage {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.allowed_formats = params
            .get_string_list("allowed_formats")?
            .unwrap_or_else(|| DEFAULT_FORMATS.iter().map(|s| s.to_string()).collect());
        Ok(())
    }
}

impl Rule for DecodableImage {
    fn apply(&mut self, path: &Path, _metadata: &Metadata) -> PluginResult<bool> {
        match Self::verify(path) {
            Ok(()) => Ok(has_extension(path, &self.allowed_formats)),
            Err(e) => {
                self.log
                    .append(format!("{} is not a valid image: {}", path.display(), e));
                Ok(false)
            }
        }
    }
}
