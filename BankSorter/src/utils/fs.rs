//! File system helpers

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Move a file, falling back to copy + delete when a plain rename is not
/// possible (e.g. source and destination on different volumes).
///
/// An existing file at `to` is replaced.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)
        .and_then(|_| fs::remove_file(from))
        .map_err(|source| Error::MoveFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

/// Files directly inside `dir` whose name ends with `suffix` (ASCII
/// case-insensitive), sorted by path
pub fn list_files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let suffix = suffix.to_ascii_lowercase();
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.to_ascii_lowercase().ends_with(&suffix))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Immediate subdirectories of `dir`, sorted by path
pub fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}
