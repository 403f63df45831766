use crate::photokeep_core::config::Config;
use crate::photokeep_core::error::{PhotokeepError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recognized media file extensions (lowercase).
const MEDIA_EXTS: &[&str] = &[
    "bmp", "gif", "heic", "jpg", "jpeg", "m4v", "mov", "mp4", "nef", "png",
];

/// A file found by a scan: its on-disk root-relative path, plus the
/// lower-cased key used for cache lookups and path comparisons.
///
/// The key compares case-insensitively across platforms; all filesystem
/// access must go through `rel_path`, which keeps the real casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub rel_path: PathBuf,
    pub key: String,
}

/// Enumerates candidate media files under the library and incoming roots.
///
/// Only files whose top-level subdirectory name begins with a digit (the
/// year-partition convention) and whose extension is recognized are
/// returned.
pub struct Library {
    library_root: PathBuf,
    incoming_root: PathBuf,
    ignore_dirs: Vec<PathBuf>,
}

impl Library {
    pub fn new(config: &Config) -> Self {
        Library {
            library_root: config.library_root.clone(),
            incoming_root: config.incoming_root.clone(),
            ignore_dirs: config.ignore_dirs.clone(),
        }
    }

    pub fn library_root(&self) -> &Path {
        &self.library_root
    }

    pub fn incoming_root(&self) -> &Path {
        &self.incoming_root
    }

    /// All media files under the library root, sorted by key. Files under
    /// the incoming root or any ignore dir are excluded.
    pub fn get_all_library_paths(&self) -> Result<Vec<ScannedFile>> {
        let mut exclusions = self.ignore_dirs.clone();
        exclusions.push(self.incoming_root.clone());
        scan_root(&self.library_root, &exclusions)
    }

    /// All media files under the incoming root, sorted by key.
    pub fn get_all_incoming_paths(&self) -> Result<Vec<ScannedFile>> {
        scan_root(&self.incoming_root, &self.ignore_dirs)
    }

    /// Move a file, creating parent directories for the target as needed.
    ///
    /// Never overwrites: an existing file at `to` is a hard error and both
    /// files are left in place.
    pub fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        if to.exists() {
            return Err(PhotokeepError::WouldOverwrite(to.to_path_buf()));
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(from, to)?;
        Ok(())
    }
}

fn scan_root(root: &Path, exclusions: &[PathBuf]) -> Result<Vec<ScannedFile>> {
    let mut paths = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !exclusions.iter().any(|ex| e.path().starts_with(ex)));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };

        if !in_year_partition(rel) {
            log::debug!("Skipping file outside year partition: {}", rel.display());
            continue;
        }
        if !has_media_extension(rel) {
            log::debug!("Skipping non-media file: {}", rel.display());
            continue;
        }

        paths.push(ScannedFile {
            rel_path: rel.to_path_buf(),
            key: rel.to_string_lossy().to_lowercase(),
        });
    }

    paths.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(paths)
}

/// The top-level subdirectory name must begin with a digit (e.g. `2020/`).
fn in_year_partition(rel: &Path) -> bool {
    let Some(first) = rel.components().next() else {
        return false;
    };
    if rel.components().count() < 2 {
        // File sits directly at the root, outside any partition
        return false;
    }
    first
        .as_os_str()
        .to_string_lossy()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}

fn has_media_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MEDIA_EXTS.contains(&e.to_lowercase().as_str()))
}
