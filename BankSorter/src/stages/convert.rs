//! Audio transcoding stage

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::{ItemOutcome, ToolStageReport, worker_pool};
use crate::error::Result;
use crate::progress::StageContext;
use crate::tools::Transcoder;
use crate::utils::file_name_str;

/// Where the transcoded copy of `source` goes: `dest_dir/<file name>.wav`
#[must_use]
pub fn converted_path(source: &Path, dest_dir: &Path) -> Option<PathBuf> {
    file_name_str(source).map(|name| dest_dir.join(format!("{name}.wav")))
}

/// Transcode every file in `sources` into `dest_dir` as `<file>.wav`, with
/// up to `workers` transcoder processes at once
pub fn convert_partition(
    transcoder: &dyn Transcoder,
    sources: &[PathBuf],
    dest_dir: &Path,
    workers: usize,
    ctx: StageContext<'_>,
) -> Result<ToolStageReport> {
    let total = sources.len();
    ctx.started(total, format!("{total} sound files"));
    if total == 0 {
        tracing::info!("No sound files to convert for {}", dest_dir.display());
        ctx.finished(0, "No sound files found");
        return Ok(ToolStageReport::default());
    }

    fs::create_dir_all(dest_dir)?;

    let processed = AtomicUsize::new(0);
    let pool = worker_pool(workers)?;

    let outcomes: Vec<ItemOutcome> = pool.install(|| {
        sources
            .par_iter()
            .map(|source| {
                if ctx.is_cancelled() {
                    return ItemOutcome::Cancelled;
                }
                let result = converted_path(source, dest_dir)
                    .ok_or_else(|| "file name is not valid UTF-8".to_string())
                    .and_then(|dest| {
                        transcoder
                            .transcode(source, &dest)
                            .map_err(|e| e.to_string())
                    });

                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                let label = file_name_str(source).unwrap_or("?");
                ctx.progress(current, total, label);
                match result {
                    Ok(()) => ItemOutcome::Done,
                    Err(reason) => {
                        tracing::warn!("Failed to convert {}: {}", source.display(), reason);
                        ctx.failed(format!("{label}: {reason}"));
                        ItemOutcome::Failed(source.clone(), reason)
                    }
                }
            })
            .collect()
    });

    let report = ToolStageReport::from_outcomes(total, outcomes);
    if report.cancelled {
        ctx.cancelled();
    } else {
        ctx.finished(
            total,
            format!("{} converted, {} failed", report.succeeded, report.failed.len()),
        );
    }
    Ok(report)
}
