//! CLI commands for the saved configuration

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::run::load_config;
use crate::config::PipelineConfig;

fn target_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => PipelineConfig::default_path().context("no user config directory on this system"),
    }
}

/// Print the effective configuration
pub fn show(config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Write a default config file
pub fn init(output: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = target_path(output)?;
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let config = PipelineConfig::default();
    let path = match output {
        Some(path) => {
            config.save_to(path)?;
            path.to_path_buf()
        }
        None => config.save()?,
    };
    println!("Wrote default config to {}", path.display());
    Ok(())
}

/// Change one setting and save
pub fn set(key: &str, value: &str, config: Option<&Path>) -> anyhow::Result<()> {
    let path = target_path(config)?;
    let mut settings = if path.is_file() {
        PipelineConfig::load_from(&path)?
    } else {
        PipelineConfig::default()
    };
    settings.set(key, value)?;
    settings.validate()?;
    settings.save_to(&path)?;
    println!("{key} = {value} ({})", path.display());
    Ok(())
}

/// Print the user config location
pub fn path() -> anyhow::Result<()> {
    println!("{}", target_path(None)?.display());
    Ok(())
}
