//! Path utilities

use std::path::Path;

/// Normalize path separators to forward slashes (for display and JSON)
pub fn normalize_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Path relative to `base` with normalized separators, or the full path if
/// it does not live under `base`
pub fn display_relative<P: AsRef<Path>, B: AsRef<Path>>(path: P, base: B) -> String {
    let path = path.as_ref();
    path.strip_prefix(base.as_ref())
        .map_or_else(|_| normalize_path(path), normalize_path)
}

/// Final path component as a string, if it is valid UTF-8
pub fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Expand a leading `~` to the user's home directory
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> std::path::PathBuf {
    let path = path.as_ref();
    match path.to_str() {
        Some(s) => shellexpand::tilde(s).into_owned().into(),
        None => path.to_path_buf(),
    }
}
