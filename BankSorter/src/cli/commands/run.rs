//! CLI command for running the full pipeline

use std::path::Path;

use console::style;

use super::PathOverrides;
use crate::cli::progress::{print_done, with_renderer};
use crate::config::{PipelineConfig, StageToggles};
use crate::partition::Partition;
use crate::pipeline::{Pipeline, PipelineSummary, StageOutcome};

/// Arguments of `banksorter run`
pub struct RunOptions<'a> {
    pub config: Option<&'a Path>,
    /// Stages requested on the command line; `None` keeps the configured ones
    pub stages: Option<StageToggles>,
    pub partitions: &'a [Partition],
    pub workers: Option<usize>,
    pub timeout: Option<u64>,
    pub sequential: bool,
    pub paths: &'a PathOverrides,
    pub quiet: bool,
}

/// Load the config named on the command line, or the user config
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    Ok(match path {
        Some(path) => PipelineConfig::load_from(path)?,
        None => PipelineConfig::load()?,
    })
}

pub fn execute(options: &RunOptions<'_>) -> anyhow::Result<()> {
    let mut config = options.paths.apply(load_config(options.config)?);
    if let Some(stages) = options.stages {
        config.stages = stages;
    }
    if !options.partitions.is_empty() {
        config.partitions = options.partitions.to_vec();
    }
    if let Some(workers) = options.workers {
        config.workers = workers;
    }
    if options.timeout.is_some() {
        config.tool_timeout_secs = options.timeout;
    }
    if options.sequential {
        config.parallel_partitions = false;
    }

    if !config.stages.any() {
        println!("No stages enabled; pass --all or one of --decode/--convert/--group/--rename");
        return Ok(());
    }

    let summary = with_renderer(options.quiet, |events| {
        Pipeline::new(config).with_events(events).run()
    })?;

    print_summary(&summary);

    if summary.has_aborts() {
        anyhow::bail!("one or more stages aborted");
    }
    Ok(())
}

fn outcome_line<T>(outcome: &StageOutcome<T>, describe: impl Fn(&T) -> String) -> Option<String> {
    match outcome {
        StageOutcome::Disabled => None,
        StageOutcome::Completed(report) => Some(describe(report)),
        StageOutcome::Aborted(reason) => Some(format!("{} {reason}", style("aborted:").red())),
        StageOutcome::NotRun => Some(style("not run (cancelled)").yellow().to_string()),
    }
}

/// Print per-partition results followed by every recorded issue
pub fn print_summary(summary: &PipelineSummary) {
    println!();
    for partition in &summary.partitions {
        println!("{}", style(partition.partition).bold());
        let lines = [
            (
                "decode",
                outcome_line(&partition.decode, |r| {
                    format!("{}/{} banks decoded", r.succeeded, r.total)
                }),
            ),
            (
                "convert",
                outcome_line(&partition.convert, |r| {
                    format!("{}/{} files converted", r.succeeded, r.total)
                }),
            ),
            (
                "group",
                outcome_line(&partition.group, |r| {
                    format!("{} files moved into {} banks", r.moved, r.banks)
                }),
            ),
            (
                "rename",
                outcome_line(&partition.rename, |r| {
                    format!("{} files renamed in {} folders", r.renamed, r.folders)
                }),
            ),
        ];
        for (stage, line) in lines
            .into_iter()
            .filter_map(|(stage, line)| line.map(|l| (stage, l)))
        {
            println!("  {stage:8} {line}");
        }
    }

    let issues = summary.issues();
    if !issues.is_empty() {
        println!();
        println!("{} ({}):", style("Skipped or failed").yellow().bold(), issues.len());
        for issue in &issues {
            println!("  {issue}");
        }
    }

    if summary.cancelled {
        println!("{}", style("Run was cancelled").yellow());
    }
    print_done(summary.elapsed);
}
