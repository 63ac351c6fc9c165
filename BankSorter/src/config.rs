//! Pipeline configuration
//!
//! Loaded once (from `<config dir>/BankSorter/config.json` or an explicit
//! file) and passed by reference to the pipeline. Missing fields fall back to
//! the defaults below, which are relative to the working directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::partition::Partition;
use crate::utils::expand_tilde;

// Default value functions for serde
fn default_unpacked_data() -> PathBuf {
    PathBuf::from("UnpackedData")
}
fn default_audio_converted() -> PathBuf {
    PathBuf::from("ConvertedAudio")
}
fn default_banks_converted() -> PathBuf {
    PathBuf::from("ConvertedBanks")
}
fn default_knowledge_base() -> PathBuf {
    PathBuf::from("wiki_data.json")
}
fn default_wwiser_pyz() -> PathBuf {
    PathBuf::from("dependencies/wwiser.pyz")
}
fn default_vgmstream_dir() -> PathBuf {
    PathBuf::from("dependencies/vgmstream-win64")
}
fn default_python() -> PathBuf {
    PathBuf::from(if cfg!(windows) { "python" } else { "python3" })
}
fn default_output_json() -> PathBuf {
    PathBuf::from("bg3_sounds.json")
}
fn default_partitions() -> Vec<Partition> {
    Partition::ALL.to_vec()
}
fn default_workers() -> usize {
    4
}
fn default_true() -> bool {
    true
}

/// Which stages a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageToggles {
    #[serde(default)]
    pub decode: bool,
    #[serde(default)]
    pub convert: bool,
    #[serde(default = "default_true")]
    pub group: bool,
    #[serde(default = "default_true")]
    pub rename: bool,
}

impl Default for StageToggles {
    fn default() -> Self {
        Self {
            decode: false,
            convert: false,
            group: true,
            rename: true,
        }
    }
}

impl StageToggles {
    /// Every stage enabled
    #[must_use]
    pub fn all() -> Self {
        Self {
            decode: true,
            convert: true,
            group: true,
            rename: true,
        }
    }

    /// No stage enabled
    #[must_use]
    pub fn none() -> Self {
        Self {
            decode: false,
            convert: false,
            group: false,
            rename: false,
        }
    }

    #[must_use]
    pub fn any(&self) -> bool {
        self.decode || self.convert || self.group || self.rename
    }
}

/// Everything a pipeline run needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the unpacked game data (`SharedSounds`, `SharedSoundBanks`)
    #[serde(default = "default_unpacked_data")]
    pub unpacked_data: PathBuf,
    /// Converted-audio tree (`<partition>/<id>.wem.wav`)
    #[serde(default = "default_audio_converted")]
    pub audio_converted: PathBuf,
    /// Converted-banks tree (`<partition>/<bank>/<bank>.bnk.xml`)
    #[serde(default = "default_banks_converted")]
    pub banks_converted: PathBuf,
    /// Wiki snapshot: a JSON file or a folder of `*.bnk.md` pages
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: PathBuf,
    #[serde(default = "default_wwiser_pyz")]
    pub wwiser_pyz: PathBuf,
    /// Folder holding `vgmstream-cli`
    #[serde(default = "default_vgmstream_dir")]
    pub vgmstream_dir: PathBuf,
    /// Python interpreter used to run `wwiser`
    #[serde(default = "default_python")]
    pub python: PathBuf,
    /// Bank dictionary output
    #[serde(default = "default_output_json")]
    pub output_json: PathBuf,
    /// Where the bank dictionary keeps its descriptors (deleted when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_output_dir: Option<PathBuf>,
    #[serde(default)]
    pub stages: StageToggles,
    #[serde(default = "default_partitions")]
    pub partitions: Vec<Partition>,
    /// Concurrent tool processes per partition
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Run the partitions side by side
    #[serde(default = "default_true")]
    pub parallel_partitions: bool,
    /// Kill a tool process after this many seconds (no limit when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            unpacked_data: default_unpacked_data(),
            audio_converted: default_audio_converted(),
            banks_converted: default_banks_converted(),
            knowledge_base: default_knowledge_base(),
            wwiser_pyz: default_wwiser_pyz(),
            vgmstream_dir: default_vgmstream_dir(),
            python: default_python(),
            output_json: default_output_json(),
            xml_output_dir: None,
            stages: StageToggles::default(),
            partitions: default_partitions(),
            workers: default_workers(),
            parallel_partitions: true,
            tool_timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    /// Default location of the persisted config
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("BankSorter").join("config.json"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config.expanded())
    }

    /// Save to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| Error::InvalidConfig("no user config directory".into()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to an explicit file, creating parent directories
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Expand `~` in every path field
    #[must_use]
    pub fn expanded(mut self) -> Self {
        for path in [
            &mut self.unpacked_data,
            &mut self.audio_converted,
            &mut self.banks_converted,
            &mut self.knowledge_base,
            &mut self.wwiser_pyz,
            &mut self.vgmstream_dir,
            &mut self.python,
            &mut self.output_json,
        ] {
            *path = expand_tilde(&*path);
        }
        if let Some(dir) = &mut self.xml_output_dir {
            *dir = expand_tilde(&*dir);
        }
        self
    }

    /// Reject settings no run can use
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be at least 1".into()));
        }
        if self.partitions.is_empty() {
            return Err(Error::InvalidConfig("no partitions selected".into()));
        }
        Ok(())
    }

    /// Selected partitions, deduplicated, in canonical order
    #[must_use]
    pub fn selected_partitions(&self) -> Vec<Partition> {
        Partition::ALL
            .into_iter()
            .filter(|p| self.partitions.contains(p))
            .collect()
    }

    #[must_use]
    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }

    /// `ConvertedAudio/<partition>`
    #[must_use]
    pub fn sounds_dir(&self, partition: Partition) -> PathBuf {
        self.audio_converted.join(partition.as_str())
    }

    /// `ConvertedBanks/<partition>`
    #[must_use]
    pub fn banks_dir(&self, partition: Partition) -> PathBuf {
        self.banks_converted.join(partition.as_str())
    }

    // Builder-style setters

    #[must_use]
    pub fn with_unpacked_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.unpacked_data = path.into();
        self
    }

    #[must_use]
    pub fn with_audio_converted(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio_converted = path.into();
        self
    }

    #[must_use]
    pub fn with_banks_converted(mut self, path: impl Into<PathBuf>) -> Self {
        self.banks_converted = path.into();
        self
    }

    #[must_use]
    pub fn with_knowledge_base(mut self, path: impl Into<PathBuf>) -> Self {
        self.knowledge_base = path.into();
        self
    }

    #[must_use]
    pub fn with_wwiser_pyz(mut self, path: impl Into<PathBuf>) -> Self {
        self.wwiser_pyz = path.into();
        self
    }

    #[must_use]
    pub fn with_vgmstream_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.vgmstream_dir = path.into();
        self
    }

    #[must_use]
    pub fn with_python(mut self, path: impl Into<PathBuf>) -> Self {
        self.python = path.into();
        self
    }

    #[must_use]
    pub fn with_output_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_json = path.into();
        self
    }

    #[must_use]
    pub fn with_stages(mut self, stages: StageToggles) -> Self {
        self.stages = stages;
        self
    }

    #[must_use]
    pub fn with_partitions(mut self, partitions: Vec<Partition>) -> Self {
        self.partitions = partitions;
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_parallel_partitions(mut self, parallel: bool) -> Self {
        self.parallel_partitions = parallel;
        self
    }

    #[must_use]
    pub fn with_tool_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.tool_timeout_secs = secs;
        self
    }

    /// Apply a `key = value` setting by field name (used by `config set`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let flag = |v: &str| -> Result<bool> {
            v.parse()
                .map_err(|_| Error::InvalidConfig(format!("{key}: expected true or false")))
        };
        match key {
            "unpacked_data" => self.unpacked_data = expand_tilde(value),
            "audio_converted" => self.audio_converted = expand_tilde(value),
            "banks_converted" => self.banks_converted = expand_tilde(value),
            "knowledge_base" => self.knowledge_base = expand_tilde(value),
            "wwiser_pyz" => self.wwiser_pyz = expand_tilde(value),
            "vgmstream_dir" => self.vgmstream_dir = expand_tilde(value),
            "python" => self.python = expand_tilde(value),
            "output_json" => self.output_json = expand_tilde(value),
            "xml_output_dir" => {
                self.xml_output_dir = (!value.is_empty()).then(|| expand_tilde(value));
            }
            "decode" => self.stages.decode = flag(value)?,
            "convert" => self.stages.convert = flag(value)?,
            "group" => self.stages.group = flag(value)?,
            "rename" => self.stages.rename = flag(value)?,
            "parallel_partitions" => self.parallel_partitions = flag(value)?,
            "workers" => {
                self.workers = value
                    .parse()
                    .map_err(|_| Error::InvalidConfig(format!("workers: '{value}' is not a number")))?;
            }
            "tool_timeout_secs" => {
                self.tool_timeout_secs = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        Error::InvalidConfig(format!("tool_timeout_secs: '{value}' is not a number"))
                    })?)
                };
            }
            "partitions" => {
                self.partitions = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::parse::<Partition>)
                    .collect::<std::result::Result<_, _>>()
                    .map_err(Error::InvalidConfig)?;
            }
            _ => return Err(Error::InvalidConfig(format!("unknown setting '{key}'"))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.audio_converted, PathBuf::from("ConvertedAudio"));
        assert_eq!(config.banks_converted, PathBuf::from("ConvertedBanks"));
        assert_eq!(config.knowledge_base, PathBuf::from("wiki_data.json"));
        assert_eq!(config.workers, 4);
        assert_eq!(
            config.sounds_dir(Partition::SharedDev),
            PathBuf::from("ConvertedAudio/SharedDev")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"workers": 8, "stages": {"decode": true}}"#).unwrap();

        let config = PipelineConfig::load_from(&path).unwrap();
        assert_eq!(config.workers, 8);
        assert!(config.stages.decode);
        assert!(config.stages.group);
        assert_eq!(config.partitions, Partition::ALL.to_vec());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.json");
        let config = PipelineConfig::default()
            .with_workers(2)
            .with_partitions(vec![Partition::Shared])
            .with_tool_timeout_secs(Some(30));

        config.save_to(&path).unwrap();
        let loaded = PipelineConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.tool_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_set() {
        let mut config = PipelineConfig::default();
        config.set("partitions", "SharedDev, Shared").unwrap();
        config.set("decode", "true").unwrap();
        config.set("tool_timeout_secs", "120").unwrap();

        assert_eq!(config.selected_partitions(), Partition::ALL.to_vec());
        assert!(config.stages.decode);
        assert_eq!(config.tool_timeout_secs, Some(120));
        assert!(config.set("workers", "many").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert!(config.set("partitions", "Public").is_err());
    }

    #[test]
    fn test_validate() {
        let config = PipelineConfig::default().with_workers(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        let config = PipelineConfig::default().with_partitions(Vec::new());
        assert!(config.validate().is_err());
    }
}
