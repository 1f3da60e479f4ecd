//! Candidate discovery under a source directory.

use sidm_common::paths::has_extension;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// List candidate files under `root`.
///
/// Recursive mode descends into every subdirectory; shallow mode only
/// looks at `root` itself. Entries are sorted by file name within each
/// directory, so the order is stable across runs. The whole list is
/// collected before any file is touched, which keeps files written by
/// actions during the run from being picked up as new candidates.
///
/// `extensions` narrows the candidates; an empty list keeps every file.
pub fn discover<S: AsRef<str>>(root: &Path, recursive: bool, extensions: &[S]) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(root).follow_links(true).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {:?}: {}", root, e);
                continue;
            }
        };

        // Skip directories
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if !extensions.is_empty() && !has_extension(&path, extensions) {
            debug!("Ignoring {:?}: extension not selected", path);
            continue;
        }
        files.push(path);
    }

    debug!("Discovered {} candidate files under {:?}", files.len(), root);
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"n").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/c.png"), b"c").unwrap();
        dir
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_recursive_sorted() {
        let dir = tree();
        let none: [&str; 0] = [];
        let files = discover(dir.path(), true, &none);
        assert_eq!(
            names(dir.path(), &files),
            vec!["a.jpg", "b.png", "nested/c.png", "notes.txt"]
        );
    }

    #[test]
    fn test_shallow_skips_subdirectories() {
        let dir = tree();
        let none: [&str; 0] = [];
        let files = discover(dir.path(), false, &none);
        assert_eq!(names(dir.path(), &files), vec!["a.jpg", "b.png", "notes.txt"]);
    }

    #[test]
    fn test_extension_filter() {
        let dir = tree();
        let files = discover(dir.path(), true, &[".PNG"]);
        assert_eq!(names(dir.path(), &files), vec!["b.png", "nested/c.png"]);
    }
}
