//! Pipeline stages
//!
//! Each stage works on a single partition and is usable on its own:
//! - [`decode`]: `.bnk` → `ConvertedBanks/<partition>/<bank>/<bank>.bnk.xml`
//! - [`convert`]: `.wem` → `ConvertedAudio/<partition>/<id>.wem.wav`
//! - [`group`]: loose `<id>.wem.wav` → `ConvertedAudio/<partition>/<bank>/`
//! - [`rename`]: `<bank>/<id>.wem.wav` → `<bank>/<display name>.wav`
//!
//! Per-item problems are collected into the stage's report; only stage-level
//! IO errors are returned as `Err`.

pub mod convert;
pub mod decode;
pub mod group;
pub mod rename;
pub mod sources;

use std::path::PathBuf;

use crate::error::{Error, Result};

pub use convert::convert_partition;
pub use decode::decode_partition;
pub use group::{GroupReport, group_partition};
pub use rename::{RenameReport, rename_partition};
pub use sources::find_sources;

/// Result of a stage that runs an external tool once per input file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolStageReport {
    /// Number of input files found
    pub total: usize,
    /// Number of files the tool processed successfully
    pub succeeded: usize,
    /// Files the tool failed on, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Whether the stage stopped early on cancellation
    pub cancelled: bool,
}

impl ToolStageReport {
    /// Files that were never attempted because of cancellation
    #[must_use]
    pub fn not_attempted(&self) -> usize {
        self.total.saturating_sub(self.succeeded + self.failed.len())
    }
}

/// Outcome of one tool invocation inside a parallel batch
pub(crate) enum ItemOutcome {
    Done,
    Failed(PathBuf, String),
    Cancelled,
}

impl ToolStageReport {
    pub(crate) fn from_outcomes(total: usize, outcomes: Vec<ItemOutcome>) -> Self {
        let mut report = Self {
            total,
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Done => report.succeeded += 1,
                ItemOutcome::Failed(path, reason) => report.failed.push((path, reason)),
                ItemOutcome::Cancelled => report.cancelled = true,
            }
        }
        report
    }
}

/// Build a bounded rayon pool for one partition's tool invocations
pub(crate) fn worker_pool(workers: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| Error::InvalidConfig(format!("cannot start {workers} workers: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let outcomes = vec![
            ItemOutcome::Done,
            ItemOutcome::Failed(PathBuf::from("a.wem"), "boom".into()),
            ItemOutcome::Cancelled,
        ];
        let report = ToolStageReport::from_outcomes(4, outcomes);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.not_attempted(), 2);
        assert!(report.cancelled);
    }
}
