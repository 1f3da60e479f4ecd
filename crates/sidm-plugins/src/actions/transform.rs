//! Actions that rewrite image pixels.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use sidm_common::paths::extension_of;
use sidm_common::{Metadata, Params, PluginError, PluginResult, RunLog};
use sidm_pipeline::{Action, Plugin};

use crate::imaging;

fn require_edge(params: &Params, name: &str) -> PluginResult<u32> {
    let value = params.require_u64(name)?;
    match u32::try_from(value) {
        Ok(edge) if edge > 0 => Ok(edge),
        _ => Err(PluginError::invalid_param(
            name,
            format!("expected a positive pixel count, got {value}"),
        )),
    }
}

/// Shrinks each image in place to fit within `max_width` x `max_height`,
/// keeping the aspect ratio. Images that already fit are left untouched.
pub struct ResizeImage {
    log: RunLog,
    max_width: u32,
    max_height: u32,
}

impl ResizeImage {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            max_width: 0,
            max_height: 0,
        }
    }
}

impl Plugin for ResizeImage {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.max_width = require_edge(params, "max_width")?;
        self.max_height = require_edge(params, "max_height")?;
        self.log.append(format!(
            "Initialized ResizeImage with max dimensions: {}x{}",
            self.max_width, self.max_height
        ));
        Ok(())
    }
}

impl Action for ResizeImage {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        for path in &paths {
            let img = imaging::open(path)?;
            let (width, height) = (img.width(), img.height());
            if width <= self.max_width && height <= self.max_height {
                self.log
                    .append(format!("No resize needed for {}", path.display()));
                continue;
            }

            let resized = img.thumbnail(self.max_width, self.max_height);
            imaging::save(&resized, path)?;
            self.log.append(format!(
                "Resized {} from {}x{} to {}x{}",
                path.display(),
                width,
                height,
                resized.width(),
                resized.height()
            ));
        }
        Ok(paths)
    }
}

/// Re-encodes each image as `<stem>.jpg` next to the original, removing the
/// original when the name changed.
pub struct ConvertToJpeg {
    log: RunLog,
}

impl ConvertToJpeg {
    pub fn new(log: RunLog) -> Self {
        Self { log }
    }
}

impl Plugin for ConvertToJpeg {
    fn initialize(&mut self, _params: &Params) -> PluginResult<()> {
        self.log.append("Initialized ConvertToJPEG");
        Ok(())
    }
}

impl Action for ConvertToJpeg {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        let mut converted = Vec::with_capacity(paths.len());
        for path in paths {
            let img = imaging::flatten(imaging::open(&path)?);
            let already_jpeg = matches!(extension_of(&path).as_deref(), Some("jpg" | "jpeg"));
            let target = if already_jpeg {
                path.clone()
            } else {
                path.with_extension("jpg")
            };
            imaging::save_as(&img, &target, ImageFormat::Jpeg)?;

            if !already_jpeg && !same_file(&path, &target) {
                std::fs::remove_file(&path)?;
                self.log.append(format!(
                    "Converted {} to {}",
                    path.display(),
                    target.display()
                ));
            } else {
                self.log
                    .append(format!("File {} is already a JPEG", path.display()));
            }
            converted.push(target);
        }
        Ok(converted)
    }
}

/// Both paths resolve to the same file on disk.
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

const DEFAULT_QUALITY: u8 = 95;

/// Writes an RGB copy of each image in `output_format` (default `JPEG`) to
/// `output_dir` (default `./converted_images`). The original stays put and
/// the copies become the working set.
pub struct Convert {
    log: RunLog,
    format: ImageFormat,
    extension: String,
    output_dir: PathBuf,
    quality: u8,
}

impl Convert {
    pub fn new(log: RunLog) -> Self {
        Self {
            log,
            format: ImageFormat::Jpeg,
            extension: "jpeg".to_string(),
            output_dir: PathBuf::from("./converted_images"),
            quality: DEFAULT_QUALITY,
        }
    }
}

impl Plugin for Convert {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        if let Some(name) = params.get_str("output_format")? {
            self.format = imaging::parse_format(name).ok_or_else(|| {
                PluginError::invalid_param("output_format", format!("unknown image format '{name}'"))
            })?;
            self.extension = name.trim().trim_start_matches('.').to_lowercase();
        }
        if let Some(dir) = params.get_path("output_dir")? {
            self.output_dir = dir;
        }
        if let Some(quality) = params.get_u64("quality")? {
            self.quality = u8::try_from(quality)
                .ok()
                .filter(|q| (1..=100).contains(q))
                .ok_or_else(|| PluginError::invalid_param("quality", "expected 1-100"))?;
        }
        self.log.append(format!(
            "Initialized Convert with output_format: {}, output_dir: {}",
            self.extension.to_uppercase(),
            self.output_dir.display()
        ));
        Ok(())
    }
}

impl Action for Convert {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;
        let mut converted = Vec::with_capacity(paths.len());
        for path in paths {
            let img = DynamicImage::ImageRgb8(imaging::open(&path)?.to_rgb8());
            let target = imaging::sibling(&self.output_dir, &path, "", &self.extension);
            if self.format == ImageFormat::Jpeg {
                imaging::save_jpeg(&img, &target, self.quality)?;
            } else {
                imaging::save_as(&img, &target, self.format)?;
            }
            self.log.append(format!(
                "Converted {} to {} in format {}",
                path.display(),
                target.display(),
                self.extension.to_uppercase()
            ));
            converted.push(target);
        }
        Ok(converted)
    }
}

/// Scales every color channel by `brightness_factor` (required; `1.0` is a
/// no-op, `0.0` is black) and saves in place. Alpha is preserved.
pub struct AdjustBrightness {
    log: RunLog,
    factor: f64,
}

impl AdjustBrightness {
    pub fn new(log: RunLog) -> Self {
        Self { log, factor: 1.0 }
    }

    fn adjust(&self, img: DynamicImage) -> DynamicImage {
        let had_alpha = img.color().has_alpha();
        let mut rgba = img.to_rgba8();
        for pixel in rgba.pixels_mut() {
            for channel in &mut pixel.0[..3] {
                *channel = (f64::from(*channel) * self.factor).round().clamp(0.0, 255.0) as u8;
            }
        }
        let adjusted = DynamicImage::ImageRgba8(rgba);
        if had_alpha {
            adjusted
        } else {
            imaging::flatten(adjusted)
        }
    }
}

impl Plugin for AdjustBrightness {
    fn initialize(&mut self, params: &Params) -> PluginResult<()> {
        self.factor = params.require_f64("brightness_factor")?;
        if !self.factor.is_finite() || self.factor < 0.0 {
            return Err(PluginError::invalid_param(
                "brightness_factor",
                "expected a non-negative number",
            ));
        }
        self.log.append(format!(
            "Initialized AdjustBrightness with factor: {}",
            self.factor
        ));
        Ok(())
    }
}

impl Action for AdjustBrightness {
    fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
        for path in &paths {
            let adjusted = self.adjust(imaging::open(path)?);
            imaging::save(&adjusted, path)?;
            self.log
                .append(format!("Adjusted brightness of {}", path.display()));
        }
        Ok(paths)
    }
}
