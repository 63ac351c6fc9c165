//! Game data partitions
//!
//! BG3 ships its Wwise assets in two independent trees, `Shared` and
//! `SharedDev`. Every output directory mirrors that split, and the pipeline
//! never moves files across it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two top-level asset partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Partition {
    Shared,
    SharedDev,
}

impl Partition {
    /// Both partitions, in processing order
    pub const ALL: [Partition; 2] = [Partition::Shared, Partition::SharedDev];

    /// Directory name of this partition (exact, case-sensitive)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "Shared",
            Self::SharedDev => "SharedDev",
        }
    }

    /// Directory of the unpacked `.wem` sources for this partition
    #[must_use]
    pub fn sounds_source(self, unpacked_data: &Path) -> PathBuf {
        unpacked_data
            .join("SharedSounds")
            .join("Public")
            .join(self.as_str())
            .join("Assets")
            .join("Sound")
    }

    /// Directory of the unpacked `.bnk` sources for this partition
    #[must_use]
    pub fn banks_source(self, unpacked_data: &Path) -> PathBuf {
        unpacked_data
            .join("SharedSoundBanks")
            .join("Public")
            .join(self.as_str())
            .join("Assets")
            .join("Sound")
    }

    /// Classify a path by the partition directory it lives under.
    ///
    /// The last matching component wins, so a `SharedDev` folder nested
    /// below a `Shared` one is classified as `SharedDev`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.components()
            .filter_map(|c| c.as_os_str().to_str())
            .filter_map(|name| name.parse().ok())
            .last()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Partition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Shared" => Ok(Self::Shared),
            "SharedDev" => Ok(Self::SharedDev),
            _ => Err(format!(
                "Invalid partition '{s}'. Valid values: Shared, SharedDev"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_layout() {
        let root = Path::new("/data");
        assert_eq!(
            Partition::SharedDev.banks_source(root),
            PathBuf::from("/data/SharedSoundBanks/Public/SharedDev/Assets/Sound")
        );
        assert_eq!(
            Partition::Shared.sounds_source(root),
            PathBuf::from("/data/SharedSounds/Public/Shared/Assets/Sound")
        );
    }

    #[test]
    fn test_from_path() {
        let shared = Path::new("/x/SharedSounds/Public/Shared/Assets/Sound/1.wem");
        let dev = Path::new("/x/SharedSounds/Public/SharedDev/Assets/Sound/1.wem");
        let other = Path::new("/x/Mods/Sound/1.wem");

        assert_eq!(Partition::from_path(shared), Some(Partition::Shared));
        assert_eq!(Partition::from_path(dev), Some(Partition::SharedDev));
        assert_eq!(Partition::from_path(other), None);
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!("Shared".parse::<Partition>(), Ok(Partition::Shared));
        assert!("shared".parse::<Partition>().is_err());
    }
}
