use std::path::PathBuf;

use image::{Rgb, RgbImage};
use sidm_common::{Metadata, Params, PluginError, PluginResult, RunLog};
use sidm_pipeline::{Plugin, SourceAction};

/// Generates a solid-color PNG from configuration alone.
///
/// Parameters: `output_dir` (default `./generated`), `width` and `height`
/// (default 64), `color` as `#rrggbb` (default black), `file_name` (default
/// `generated.png`). An existing file is never overwritten; a numeric
/// suffix is added instead.
pub struct SolidColor {
    log: RunLog,
    output_dir: PathBuf,
    width: u32,
    height: u32,
    color: Rgb<u8>,
    file_name: String,
}

impl SolidColor {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            output_dir: PathBuf::from("./generated"),
            width: 64,
            height: 64,
            color: Rgb([0, 0, 0]),
            file_name: "generated.png".to_string(),
        }
    }

    fn next_free_path(&self) -> PathBuf {
        let candidate = self.output_dir.join(&self.file_name);
        if !candidate.exists() {
            return candidate;
        }
        let name = std::path::Path::new(&self.file_name);
        let stem = name
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "generated".to_string());
        let ext = name
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "png".to_string());
        (1u32..)
            .map(|n| self.output_dir.join(format!("{stem}_{n}.{ext}")))
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }
}

/// Parse `#rrggbb` (the `#` is optional).
fn parse_color(value: &str) -> Option<Rgb<u8>> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

fn edge(params: &Params, name: &str, default: u32) -> PluginResult<u32> {
    match params.get_u64(name)? {
        None => Ok(default),
        Some(v) => u32::try_from(v)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| PluginError::invalid_param(name, "expected a positive pixel count")),
    }
}

impl Plugin for SolidColor {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        if let Some(dir) = params.get_path("output_dir")? {
            self.output_dir = dir;
        }
        self.width = edge(params, "width", self.width)?;
        self.height = edge(params, "height", self.height)?;
        if let Some(color) = params.get_str("color")? {
            self.color = parse_color(color).ok_or_else(|| {
                PluginError::invalid_param("color", format!("expected #rrggbb, got '{color}'"))
            })?;
        }
        if let Some(name) = params.get_str("file_name")? {
            self.file_name = name.to_string();
        }
        Ok(())
    }
}

impl SourceAction for SolidColor {
    fn generate(&mut self, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.next_free_path();
        RgbImage::from_pixel(self.width, self.height, self.color)
            .save(&path)
            .map_err(PluginError::image)?;
        self.log
            .append(format!("Generated image saved to {}", path.display()));
        Ok(vec![path])
    }
}
