//! Locating game source files (`.bnk`, `.wem`) for a partition

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;
use crate::partition::Partition;
use crate::utils::list_files_with_suffix;

/// Find the `extension` files to process for `partition`.
///
/// Looks directly inside `dir` first. When that yields nothing and a
/// `fallback_root` is given, the whole tree under it is searched and only
/// files whose path places them in `partition` are kept. Results are sorted.
pub fn find_sources(
    dir: &Path,
    extension: &str,
    fallback_root: Option<&Path>,
    partition: Partition,
) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));

    if dir.is_dir() {
        let files = list_files_with_suffix(dir, &suffix)?;
        if !files.is_empty() {
            return Ok(files);
        }
    }

    let Some(root) = fallback_root.filter(|r| r.is_dir()) else {
        return Ok(Vec::new());
    };

    tracing::info!(
        "No *{} files in {}, searching {} for {} sources",
        suffix,
        dir.display(),
        root.display(),
        partition
    );

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.file_type().is_file()
                && e.file_name()
                    .to_str()
                    .is_some_and(|n| n.to_ascii_lowercase().ends_with(&suffix))
        })
        .map(walkdir::DirEntry::into_path)
        .filter(|p| Partition::from_path(p) == Some(partition))
        .collect();

    files.sort();
    Ok(files)
}
