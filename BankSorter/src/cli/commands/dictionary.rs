//! CLI command for building the bank dictionary

use std::path::Path;

use super::PathOverrides;
use super::run::load_config;
use crate::cli::progress::{DISK, LOOKING_GLASS, print_done, print_step, with_renderer};
use crate::partition::Partition;
use crate::pipeline::Pipeline;

/// Arguments of `banksorter dictionary`
pub struct DictionaryArgs<'a> {
    pub config: Option<&'a Path>,
    pub output: Option<&'a Path>,
    pub xml_dir: Option<&'a Path>,
    pub partitions: &'a [Partition],
    pub workers: Option<usize>,
    pub paths: &'a PathOverrides,
    pub quiet: bool,
}

pub fn execute(args: &DictionaryArgs<'_>) -> anyhow::Result<()> {
    let started = std::time::Instant::now();
    let mut config = args.paths.apply(load_config(args.config)?);
    if let Some(output) = args.output {
        config.output_json = output.to_path_buf();
    }
    if let Some(dir) = args.xml_dir {
        config.xml_output_dir = Some(dir.to_path_buf());
    }
    if !args.partitions.is_empty() {
        config.partitions = args.partitions.to_vec();
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    let output = config.output_json.clone();

    if !args.quiet {
        print_step(
            1,
            2,
            LOOKING_GLASS,
            &format!("Indexing banks under {}", config.unpacked_data.display()),
        );
    }
    let dictionary = with_renderer(args.quiet, |events| {
        Pipeline::new(config).with_events(events).build_dictionary()
    })?;

    if !args.quiet {
        print_step(2, 2, DISK, &format!("Writing {}", output.display()));
    }
    dictionary.save(&output)?;

    for (group, banks) in &dictionary.partitions {
        let sounds: usize = banks.values().map(|b| b.sound_files.len()).sum();
        println!("  {group:10} {:>5} banks {sounds:>7} sounds", banks.len());
    }
    if !args.quiet {
        print_done(started.elapsed());
    }
    Ok(())
}
