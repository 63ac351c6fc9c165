//! Rename stage: give grouped files their display names

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::progress::StageContext;
use crate::utils::{file_name_str, list_files_with_suffix, list_subdirs};

/// Result of renaming one partition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameReport {
    /// Number of bank folders visited
    pub folders: usize,
    /// Number of files renamed
    pub renamed: usize,
    /// Rename targets that already existed and were replaced
    pub overwritten: Vec<PathBuf>,
    /// Bank folders no knowledge base page matched
    pub unmapped: Vec<String>,
    /// Files that could not be renamed, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Whether the stage stopped early on cancellation
    pub cancelled: bool,
}

/// Lookup key for a file: its name up to the first `.`
fn id_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Rename `<bank>/<id>.wem.wav` files to `<bank>/<display name>.wav` using
/// the first knowledge base page whose key contains the bank folder name.
///
/// Folders without a matching page produce a single notice and are left
/// alone. Files whose stem is not a known ID (including already renamed
/// files) are never touched.
pub fn rename_partition(
    sounds_dir: &Path,
    knowledge: &KnowledgeBase,
    ctx: StageContext<'_>,
) -> Result<RenameReport> {
    if !sounds_dir.is_dir() {
        tracing::info!("No grouped audio at {}, nothing to rename", sounds_dir.display());
        ctx.started(0, "No grouped audio");
        ctx.finished(0, format!("{} does not exist", sounds_dir.display()));
        return Ok(RenameReport::default());
    }

    let folders = list_subdirs(sounds_dir)?;
    let total = folders.len();
    let mut report = RenameReport {
        folders: total,
        ..RenameReport::default()
    };
    ctx.started(total, format!("{total} bank folders"));

    for (index, folder) in folders.iter().enumerate() {
        if ctx.is_cancelled() {
            report.cancelled = true;
            ctx.cancelled();
            return Ok(report);
        }

        let Some(folder_name) = file_name_str(folder) else {
            continue;
        };

        let Some((key, page)) = knowledge.find_page(folder_name) else {
            tracing::info!("No mappings found for {}", folder_name);
            ctx.notice(format!("No mappings found for {folder_name}"));
            report.unmapped.push(folder_name.to_string());
            ctx.progress(index + 1, total, folder_name);
            continue;
        };

        let id_map = page.id_map();
        tracing::debug!("{} matched page {} ({} IDs)", folder_name, key, id_map.len());

        let mut renamed_here = 0;
        for file in list_files_with_suffix(folder, ".wav")? {
            let Some(file_name) = file_name_str(&file) else {
                continue;
            };
            let Some(display_name) = id_map.get(id_stem(file_name)) else {
                continue;
            };

            let target = folder.join(format!("{display_name}.wav"));
            if target == file {
                continue;
            }
            if target.exists() {
                tracing::warn!(
                    "{} already exists, replacing it with {}",
                    target.display(),
                    file_name
                );
                report.overwritten.push(target.clone());
            }
            match fs::rename(&file, &target) {
                Ok(()) => renamed_here += 1,
                Err(e) => {
                    tracing::warn!("Failed to rename {}: {}", file.display(), e);
                    ctx.failed(format!("{file_name}: {e}"));
                    report.failed.push((file.clone(), e.to_string()));
                }
            }
        }

        report.renamed += renamed_here;
        ctx.progress(
            index + 1,
            total,
            format!("{folder_name}: {renamed_here} files renamed"),
        );
    }

    ctx.finished(
        total,
        format!(
            "{} files renamed, {} folders without mappings",
            report.renamed,
            report.unmapped.len()
        ),
    );
    Ok(report)
}
