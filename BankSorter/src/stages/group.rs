//! Grouping stage: collapse loose transcoded files into per-bank folders

use std::fs;
use std::path::{Path, PathBuf};

use crate::banks::{SoundId, scan_banks};
use crate::error::Result;
use crate::progress::StageContext;
use crate::utils::move_file;

/// Result of grouping one partition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupReport {
    /// Number of banks discovered
    pub banks: usize,
    /// Number of files moved into a bank folder
    pub moved: usize,
    /// `(bank, id)` pairs with no loose file to move (never converted, or
    /// already claimed by an earlier bank)
    pub skipped: Vec<(String, SoundId)>,
    /// Files that could not be moved, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Descriptors that could not be read
    pub unreadable: Vec<(PathBuf, String)>,
    /// Whether the stage stopped early on cancellation
    pub cancelled: bool,
}

/// Move every `sounds_dir/<id>.wem.wav` into `sounds_dir/<bank>/` for the
/// banks described under `banks_dir`.
///
/// Banks are processed in name order and a file moves at most once, so when
/// several banks reference the same ID the first one gets it and the others
/// record a skip. Running this again on a grouped tree moves nothing.
pub fn group_partition(
    banks_dir: &Path,
    sounds_dir: &Path,
    ctx: StageContext<'_>,
) -> Result<GroupReport> {
    if !sounds_dir.is_dir() {
        tracing::info!("No converted audio at {}, nothing to group", sounds_dir.display());
        ctx.started(0, "No converted audio");
        ctx.finished(0, format!("{} does not exist", sounds_dir.display()));
        return Ok(GroupReport::default());
    }

    let scan = scan_banks(banks_dir)?;
    let total = scan.banks.len();
    let mut report = GroupReport {
        banks: total,
        ..GroupReport::default()
    };
    for (path, reason) in scan.unreadable {
        ctx.failed(format!("{}: {}", path.display(), reason));
        report.unreadable.push((path, reason));
    }

    ctx.started(total, format!("{total} banks"));

    for (index, bank) in scan.banks.iter().enumerate() {
        if ctx.is_cancelled() {
            report.cancelled = true;
            ctx.cancelled();
            return Ok(report);
        }

        let bank_dir = sounds_dir.join(&bank.name);
        fs::create_dir_all(&bank_dir)?;

        let mut moved_here = 0;
        for id in bank.sound_ids() {
            let file_name = id.converted_filename();
            let loose = sounds_dir.join(&file_name);
            if !loose.is_file() {
                tracing::debug!("{}: skipped {} (no loose {})", bank.name, id, file_name);
                ctx.skipped(format!("{}: skipped {id}", bank.name));
                report.skipped.push((bank.name.clone(), id));
                continue;
            }
            match move_file(&loose, &bank_dir.join(&file_name)) {
                Ok(()) => moved_here += 1,
                Err(e) => {
                    tracing::warn!("{}", e);
                    ctx.failed(e.to_string());
                    report.failed.push((loose, e.to_string()));
                }
            }
        }

        tracing::debug!("Grouped {} files into {}", moved_here, bank.name);
        report.moved += moved_here;
        ctx.progress(index + 1, total, format!("{}: {} files", bank.name, moved_here));
    }

    tracing::info!(
        "Grouped {} files into {} banks ({} IDs without a loose file)",
        report.moved,
        total,
        report.skipped.len()
    );
    ctx.finished(
        total,
        format!("{} files moved, {} skipped", report.moved, report.skipped.len()),
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::progress::{EventKind, EventSink, Stage};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_bank(banks: &Path, name: &str, ids: &[u32]) {
        let dir = banks.join(name);
        fs::create_dir_all(&dir).unwrap();
        let body: String = ids
            .iter()
            .map(|id| format!("<field type=\"tid\" name=\"sourceID\" value=\"{id}\"/>\n"))
            .collect();
        fs::write(dir.join(format!("{name}.bnk.xml")), body).unwrap();
    }

    fn run(banks: &Path, sounds: &Path) -> GroupReport {
        let sink = EventSink::disconnected();
        let cancel = CancellationToken::new();
        group_partition(banks, sounds, StageContext::new(Stage::Group, &sink, &cancel)).unwrap()
    }

    #[test]
    fn test_groups_into_bank_folder() {
        let temp = TempDir::new().unwrap();
        let banks = temp.path().join("banks");
        let sounds = temp.path().join("sounds");
        fs::create_dir_all(&sounds).unwrap();
        write_bank(&banks, "AMB_01", &[100, 200]);
        fs::write(sounds.join("100.wem.wav"), "x").unwrap();
        fs::write(sounds.join("300.wem.wav"), "y").unwrap();

        let report = run(&banks, &sounds);

        assert!(sounds.join("AMB_01/100.wem.wav").is_file());
        assert!(!sounds.join("100.wem.wav").exists());
        assert!(sounds.join("300.wem.wav").is_file());
        assert_eq!(report.moved, 1);
        assert_eq!(report.skipped, vec![("AMB_01".to_string(), SoundId(200))]);
    }

    #[test]
    fn test_first_bank_claims_shared_id() {
        let temp = TempDir::new().unwrap();
        let banks = temp.path().join("banks");
        let sounds = temp.path().join("sounds");
        fs::create_dir_all(&sounds).unwrap();
        write_bank(&banks, "VO_02", &[100]);
        write_bank(&banks, "AMB_01", &[100]);
        fs::write(sounds.join("100.wem.wav"), "x").unwrap();

        let (sink, rx) = EventSink::channel();
        let cancel = CancellationToken::new();
        let report =
            group_partition(&banks, &sounds, StageContext::new(Stage::Group, &sink, &cancel))
                .unwrap();
        drop(sink);

        assert!(sounds.join("AMB_01/100.wem.wav").is_file());
        assert!(!sounds.join("VO_02/100.wem.wav").exists());
        assert!(sounds.join("VO_02").is_dir());
        assert_eq!(report.skipped, vec![("VO_02".to_string(), SoundId(100))]);

        let skipped: Vec<String> = rx
            .iter()
            .filter(|e| e.kind == EventKind::Skipped)
            .map(|e| e.message)
            .collect();
        assert_eq!(skipped, vec!["VO_02: skipped 100".to_string()]);
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let temp = TempDir::new().unwrap();
        let banks = temp.path().join("banks");
        let sounds = temp.path().join("sounds");
        fs::create_dir_all(&sounds).unwrap();
        write_bank(&banks, "AMB_01", &[100, 101]);
        fs::write(sounds.join("100.wem.wav"), "a").unwrap();
        fs::write(sounds.join("101.wem.wav"), "b").unwrap();

        let first = run(&banks, &sounds);
        let second = run(&banks, &sounds);

        assert_eq!(first.moved, 2);
        assert_eq!(second.moved, 0);
        assert_eq!(fs::read_to_string(sounds.join("AMB_01/100.wem.wav")).unwrap(), "a");
        assert_eq!(fs::read_to_string(sounds.join("AMB_01/101.wem.wav")).unwrap(), "b");
    }

    #[test]
    fn test_missing_sounds_dir_is_noop() {
        let temp = TempDir::new().unwrap();
        let banks = temp.path().join("banks");
        write_bank(&banks, "AMB_01", &[100]);

        let report = run(&banks, &temp.path().join("sounds"));
        assert_eq!(report, GroupReport::default());
        assert!(!temp.path().join("sounds").exists());
    }

    #[test]
    fn test_cancellation_stops_before_next_bank() {
        let temp = TempDir::new().unwrap();
        let banks = temp.path().join("banks");
        let sounds = temp.path().join("sounds");
        fs::create_dir_all(&sounds).unwrap();
        write_bank(&banks, "AMB_01", &[100]);
        fs::write(sounds.join("100.wem.wav"), "x").unwrap();

        let sink = EventSink::disconnected();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report =
            group_partition(&banks, &sounds, StageContext::new(Stage::Group, &sink, &cancel))
                .unwrap();

        assert!(report.cancelled);
        assert!(sounds.join("100.wem.wav").is_file());
    }
}
