//! Command execution implementations

use super::definitions::ConfigCommands;
use super::{Commands, config_cmd, dictionary, id_map, organize, run, scan};
use crate::config::StageToggles;

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Run {
                decode,
                convert,
                group,
                rename,
                all,
                config,
                partition,
                workers,
                timeout,
                sequential,
                paths,
                quiet,
            } => {
                let requested = StageToggles {
                    decode: *decode,
                    convert: *convert,
                    group: *group,
                    rename: *rename,
                };
                let stages = if *all {
                    Some(StageToggles::all())
                } else if requested.any() {
                    Some(requested)
                } else {
                    None
                };
                run::execute(&run::RunOptions {
                    config: config.as_deref(),
                    stages,
                    partitions: partition,
                    workers: *workers,
                    timeout: *timeout,
                    sequential: *sequential,
                    paths,
                    quiet: *quiet,
                })
            }
            Commands::Group {
                banks,
                sounds,
                quiet,
            } => organize::group(banks, sounds, *quiet),
            Commands::Rename {
                sounds,
                wiki,
                quiet,
            } => organize::rename(sounds, wiki, *quiet),
            Commands::Scan { banks, ids } => scan::execute(banks, *ids),
            Commands::IdMap { wiki, key } => id_map::execute(wiki, key),
            Commands::Dictionary {
                config,
                output,
                xml_dir,
                partition,
                workers,
                paths,
                quiet,
            } => dictionary::execute(&dictionary::DictionaryArgs {
                config: config.as_deref(),
                output: output.as_deref(),
                xml_dir: xml_dir.as_deref(),
                partitions: partition,
                workers: *workers,
                paths,
                quiet: *quiet,
            }),
            Commands::Config { command } => command.execute(),
        }
    }
}

impl ConfigCommands {
    /// Execute the selected config command.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read or written.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            ConfigCommands::Show { config } => config_cmd::show(config.as_deref()),
            ConfigCommands::Init { output, force } => config_cmd::init(output.as_deref(), *force),
            ConfigCommands::Set { key, value, config } => {
                config_cmd::set(key, value, config.as_deref())
            }
            ConfigCommands::Path => config_cmd::path(),
        }
    }
}
