//! Subcommand enum and shared argument definitions for CLI

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::PipelineConfig;

/// Path settings that can be overridden per invocation
#[derive(Args, Debug, Default)]
pub struct PathOverrides {
    /// Unpacked game data root (SharedSounds, SharedSoundBanks)
    #[arg(long)]
    pub unpacked: Option<PathBuf>,

    /// Converted audio output root
    #[arg(long)]
    pub audio_out: Option<PathBuf>,

    /// Decoded banks output root
    #[arg(long)]
    pub banks_out: Option<PathBuf>,

    /// Knowledge base: wiki_data.json or a folder of *.bnk.md pages
    #[arg(long)]
    pub wiki: Option<PathBuf>,

    /// Path to wwiser.pyz
    #[arg(long)]
    pub wwiser: Option<PathBuf>,

    /// Folder containing vgmstream-cli
    #[arg(long)]
    pub vgmstream: Option<PathBuf>,

    /// Python interpreter used to run wwiser
    #[arg(long)]
    pub python: Option<PathBuf>,
}

impl PathOverrides {
    /// Apply every given override on top of `config`
    #[must_use]
    pub fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(p) = &self.unpacked {
            config.unpacked_data.clone_from(p);
        }
        if let Some(p) = &self.audio_out {
            config.audio_converted.clone_from(p);
        }
        if let Some(p) = &self.banks_out {
            config.banks_converted.clone_from(p);
        }
        if let Some(p) = &self.wiki {
            config.knowledge_base.clone_from(p);
        }
        if let Some(p) = &self.wwiser {
            config.wwiser_pyz.clone_from(p);
        }
        if let Some(p) = &self.vgmstream {
            config.vgmstream_dir.clone_from(p);
        }
        if let Some(p) = &self.python {
            config.python.clone_from(p);
        }
        config.expanded()
    }
}

/// Configuration commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as JSON
    Show {
        /// Config file (defaults to the user config)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a config file with default values
    Init {
        /// Where to write (defaults to the user config location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Change one setting (e.g. `workers 8`, `partitions Shared,SharedDev`)
    Set {
        /// Setting name, as shown by `config show`
        key: String,

        /// New value
        value: String,

        /// Config file (defaults to the user config)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print where the user config lives
    Path,
}
