//! Path utilities for detecting image candidates by extension.
//!
//! Extension lists in configuration may be written with or without the
//! leading dot (`".png"` or `"png"`); everything here compares the
//! normalized lowercase form.

use std::path::Path;

/// Image extensions recognized by default.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"];

/// Lowercase extension of `path` without the leading dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Normalize a configured extension: trim, drop a leading dot, lowercase.
///
/// # Examples
///
/// ```
/// use sidm_common::paths::normalize_extension;
///
/// assert_eq!(normalize_extension(".PNG"), "png");
/// assert_eq!(normalize_extension("jpg"), "jpg");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Check if `path` has one of the given extensions (dot-insensitive,
/// case-insensitive).
pub fn has_extension<S: AsRef<str>>(path: &Path, allowed: &[S]) -> bool {
    match extension_of(path) {
        Some(ext) => allowed
            .iter()
            .any(|candidate| normalize_extension(candidate.as_ref()) == ext),
        None => false,
    }
}

/// Check if a path has an image file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use sidm_common::paths::is_image_file;
///
/// assert!(is_image_file(Path::new("poster.jpg")));
/// assert!(!is_image_file(Path::new("notes.txt")));
/// ```
pub fn is_image_file(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}
