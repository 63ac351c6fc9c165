//! CLI command definitions

pub mod config_cmd;
pub mod definitions;
pub mod dictionary;
mod execute;
pub mod id_map;
pub mod organize;
pub mod run;
pub mod scan;

use std::path::PathBuf;

use clap::Subcommand;

use crate::partition::Partition;

pub use definitions::{ConfigCommands, PathOverrides};

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline (decode, convert, group, rename)
    Run {
        /// Decode sound banks with wwiser
        #[arg(long)]
        decode: bool,

        /// Convert .wem files to .wav with vgmstream-cli
        #[arg(long)]
        convert: bool,

        /// Group converted files into per-bank folders
        #[arg(long)]
        group: bool,

        /// Rename grouped files from the wiki knowledge base
        #[arg(long)]
        rename: bool,

        /// Run every stage
        #[arg(short, long, conflicts_with_all = ["decode", "convert", "group", "rename"])]
        all: bool,

        /// Config file (defaults to the user config, then built-in defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only process these partitions (Shared, SharedDev)
        #[arg(short, long, value_delimiter = ',')]
        partition: Vec<Partition>,

        /// Concurrent tool processes per partition
        #[arg(short, long)]
        workers: Option<usize>,

        /// Kill a tool process after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Process partitions one after another
        #[arg(long)]
        sequential: bool,

        #[command(flatten)]
        paths: PathOverrides,

        /// Suppress progress bars
        #[arg(short, long)]
        quiet: bool,
    },

    /// Group loose <id>.wem.wav files of one partition into bank folders
    Group {
        /// Decoded banks for the partition (e.g. ConvertedBanks/Shared)
        banks: PathBuf,

        /// Converted audio for the partition (e.g. ConvertedAudio/Shared)
        sounds: PathBuf,

        /// Suppress progress bars
        #[arg(short, long)]
        quiet: bool,
    },

    /// Rename grouped files of one partition to their wiki names
    Rename {
        /// Grouped audio for the partition (e.g. ConvertedAudio/Shared)
        sounds: PathBuf,

        /// Knowledge base: wiki_data.json or a folder of *.bnk.md pages
        #[arg(long, default_value = "wiki_data.json")]
        wiki: PathBuf,

        /// Suppress progress bars
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the banks found in a decoded-bank folder
    Scan {
        /// Decoded banks for one partition (e.g. ConvertedBanks/Shared)
        banks: PathBuf,

        /// Also print every sound ID
        #[arg(long)]
        ids: bool,
    },

    /// Print the ID map of a knowledge base page
    #[command(name = "id-map")]
    IdMap {
        /// Knowledge base: wiki_data.json or a folder of *.bnk.md pages
        wiki: PathBuf,

        /// Page key, or a bank name matched against the keys
        key: String,
    },

    /// Build a JSON dictionary of every bank and its sounds
    Dictionary {
        /// Config file (defaults to the user config, then built-in defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output JSON file (defaults to the configured output_json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep decoded XML descriptors in this folder
        #[arg(long)]
        xml_dir: Option<PathBuf>,

        /// Only process these partitions (Shared, SharedDev)
        #[arg(short, long, value_delimiter = ',')]
        partition: Vec<Partition>,

        /// Concurrent decoder processes
        #[arg(short, long)]
        workers: Option<usize>,

        #[command(flatten)]
        paths: PathOverrides,

        /// Suppress progress bars
        #[arg(short, long)]
        quiet: bool,
    },

    /// Inspect or change the saved configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}
