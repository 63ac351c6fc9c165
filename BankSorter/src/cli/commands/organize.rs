//! CLI commands for single-stage grouping and renaming

use std::path::Path;

use crate::cancel::CancellationToken;
use crate::cli::progress::{FOLDER, LABEL, LOOKING_GLASS, print_step, with_renderer};
use crate::knowledge::KnowledgeBase;
use crate::pipeline::{group_directory, rename_directory};
use crate::utils::display_relative;

/// Group one partition's loose files into bank folders
pub fn group(banks: &Path, sounds: &Path, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        print_step(1, 1, FOLDER, &format!("Grouping {}", sounds.display()));
    }
    let cancel = CancellationToken::new();
    let report = with_renderer(quiet, |events| {
        group_directory(banks, sounds, &events, &cancel)
    })?;

    println!(
        "Moved {} files into {} banks ({} referenced IDs had no loose file)",
        report.moved,
        report.banks,
        report.skipped.len()
    );
    for (path, reason) in report.unreadable.iter().chain(&report.failed) {
        println!("  {}: {reason}", display_relative(path, sounds));
    }
    Ok(())
}

/// Rename one partition's grouped files from the knowledge base
pub fn rename(sounds: &Path, wiki: &Path, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Loading {}", wiki.display()));
    }
    let knowledge = KnowledgeBase::load(wiki)?;

    if !quiet {
        print_step(
            2,
            2,
            LABEL,
            &format!("Renaming {} ({} pages)", sounds.display(), knowledge.len()),
        );
    }
    let cancel = CancellationToken::new();
    let report = with_renderer(quiet, |events| {
        rename_directory(sounds, &knowledge, &events, &cancel)
    })?;

    println!(
        "Renamed {} files in {} folders ({} folders without mappings)",
        report.renamed,
        report.folders,
        report.unmapped.len()
    );
    for path in &report.overwritten {
        println!("  overwrote {}", display_relative(path, sounds));
    }
    for (path, reason) in &report.failed {
        println!("  {}: {reason}", display_relative(path, sounds));
    }
    Ok(())
}
