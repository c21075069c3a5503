//! Non-recursive directory scan feeding the organizer.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// One file eligible for organizing.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// File name including extension.
    pub name: String,
    /// Absolute or caller-relative path, as scanned.
    pub path: PathBuf,
    /// Lowercased extension without the dot, if any.
    pub extension: Option<String>,
    /// Size in bytes (0 when metadata is unavailable).
    pub size: u64,
    /// Guessed MIME type, if the extension maps to one.
    pub mime_type: Option<String>,
}

impl FileEntry {
    pub(crate) fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let size = fs::symlink_metadata(&path).map(|m| m.len()).unwrap_or(0);
        let mime_type = mime_guess::from_path(&path)
            .first()
            .map(|m| m.to_string());

        Self {
            name,
            path,
            extension,
            size,
            mime_type,
        }
    }
}

/// Snapshot the direct children of `target` that are plain files.
///
/// Directories (and symlinks resolving to directories) are left alone and
/// never descended into. The listing is taken in full before any move, so
/// freshly created category folders cannot feed back into the scan. Entries
/// come back sorted by name for deterministic processing order.
pub fn scan_directory(target: &Path) -> Result<Vec<FileEntry>> {
    if !target.is_dir() {
        return Err(AppError::not_a_directory(target));
    }

    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(target)? {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        if path.is_dir() {
            continue;
        }
        let entry = FileEntry::from_path(path);
        tracing::debug!(
            name = %entry.name,
            size = entry.size,
            mime = ?entry.mime_type,
            "scanned file"
        );
        entries.push(entry);
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
