//! Shared helpers for units that read or write image files.

use std::ffi::OsStr;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use sha2::{Digest, Sha256};
use sidm_common::{PluginError, PluginResult};

/// Decode the image at `path`.
pub(crate) fn open(path: &Path) -> PluginResult<DynamicImage> {
    image::open(path).map_err(|e| PluginError::image(format!("{}: {e}", path.display())))
}

/// Encode `img` to `path`, format inferred from the extension.
pub(crate) fn save(img: &DynamicImage, path: &Path) -> PluginResult<()> {
    img.save(path)
        .map_err(|e| PluginError::image(format!("{}: {e}", path.display())))
}

pub(crate) fn save_as(img: &DynamicImage, path: &Path, format: ImageFormat) -> PluginResult<()> {
    img.save_with_format(path, format)
        .map_err(|e| PluginError::image(format!("{}: {e}", path.display())))
}

/// Encode `img` as JPEG at the given quality (1-100).
pub(crate) fn save_jpeg(img: &DynamicImage, path: &Path, quality: u8) -> PluginResult<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    flatten(img.clone())
        .write_with_encoder(encoder)
        .map_err(|e| PluginError::image(format!("{}: {e}", path.display())))?;
    writer.flush()?;
    Ok(())
}

/// Width and height from the header, without decoding pixel data.
pub(crate) fn dimensions(path: &Path) -> PluginResult<(u32, u32)> {
    image::image_dimensions(path)
        .map_err(|e| PluginError::image(format!("{}: {e}", path.display())))
}

/// Parse a format name such as `JPEG`, `png` or `.webp`.
pub(crate) fn parse_format(name: &str) -> Option<ImageFormat> {
    ImageFormat::from_extension(name.trim().trim_start_matches('.').to_lowercase())
}

/// Drop the alpha channel, which JPEG cannot encode.
pub(crate) fn flatten(img: DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    }
}

/// Final path component, or an error for paths like `/` or `..`.
pub(crate) fn file_name(path: &Path) -> PluginResult<&OsStr> {
    path.file_name()
        .ok_or_else(|| PluginError::failed(format!("{} has no file name", path.display())))
}

/// `dir/<stem><suffix>.<ext>` for the file at `path`.
pub(crate) fn sibling(dir: &Path, path: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(format!("{stem}{suffix}.{ext}"))
}

/// Hex-encoded SHA-256 of a file's contents.
pub(crate) fn sha256_file(path: &Path) -> PluginResult<String> {
    let data = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&data)))
}
