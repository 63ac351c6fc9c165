//! Bank decoding stage

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::{ItemOutcome, ToolStageReport, worker_pool};
use crate::banks::DESCRIPTOR_SUFFIX;
use crate::error::Result;
use crate::progress::StageContext;
use crate::tools::BankDecoder;
use crate::utils::{file_name_str, move_file};

/// Bank name for a `.bnk` file (file name up to the first `.`)
#[must_use]
pub fn bank_name(bank: &Path) -> Option<&str> {
    file_name_str(bank)
        .and_then(|n| n.split('.').next())
        .filter(|n| !n.is_empty())
}

/// Decode every bank in `banks` and file each descriptor under
/// `output_dir/<bank>/<bank>.bnk.xml`.
///
/// Runs up to `workers` decoder processes at once. A bank the decoder fails
/// on is recorded and skipped.
pub fn decode_partition(
    decoder: &dyn BankDecoder,
    banks: &[PathBuf],
    output_dir: &Path,
    workers: usize,
    ctx: StageContext<'_>,
) -> Result<ToolStageReport> {
    let total = banks.len();
    ctx.started(total, format!("{total} banks"));
    if total == 0 {
        tracing::info!("No banks to decode for {}", output_dir.display());
        ctx.finished(0, "No banks found");
        return Ok(ToolStageReport::default());
    }

    fs::create_dir_all(output_dir)?;

    let processed = AtomicUsize::new(0);
    let pool = worker_pool(workers)?;

    let outcomes: Vec<ItemOutcome> = pool.install(|| {
        banks
            .par_iter()
            .map(|bank| {
                if ctx.is_cancelled() {
                    return ItemOutcome::Cancelled;
                }
                let outcome = decode_one(decoder, bank, output_dir);
                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                let label = file_name_str(bank).unwrap_or("?");
                match &outcome {
                    ItemOutcome::Failed(_, reason) => {
                        tracing::warn!("Failed to decode {}: {}", bank.display(), reason);
                        ctx.failed(format!("{label}: {reason}"));
                    }
                    _ => tracing::debug!("Decoded {}", bank.display()),
                }
                ctx.progress(current, total, label);
                outcome
            })
            .collect()
    });

    let report = ToolStageReport::from_outcomes(total, outcomes);
    if report.cancelled {
        ctx.cancelled();
    } else {
        ctx.finished(
            total,
            format!("{} decoded, {} failed", report.succeeded, report.failed.len()),
        );
    }
    Ok(report)
}

fn decode_one(decoder: &dyn BankDecoder, bank: &Path, output_dir: &Path) -> ItemOutcome {
    let fail = |reason: String| ItemOutcome::Failed(bank.to_path_buf(), reason);

    let Some(name) = bank_name(bank) else {
        return fail("cannot derive a bank name".into());
    };
    let bank_dir = output_dir.join(name);
    if let Err(e) = fs::create_dir_all(&bank_dir) {
        return fail(e.to_string());
    }

    let produced = match decoder.decode(bank) {
        Ok(path) => path,
        Err(e) => return fail(e.to_string()),
    };

    let target = bank_dir.join(format!("{name}{DESCRIPTOR_SUFFIX}"));
    if produced == target {
        return ItemOutcome::Done;
    }
    match move_file(&produced, &target) {
        Ok(()) => ItemOutcome::Done,
        Err(e) => fail(e.to_string()),
    }
}
