//! Bank dictionary: a JSON index of every bank and the sounds it embeds
//!
//! Independent of the grouping pipeline. Every `.bnk` under the unpacked
//! game data is decoded, its descriptor parsed, and the result written as
//! `{partition: {bank: {name, sound_files: {id: {...}}}}}`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::descriptor::{BankDescriptor, DESCRIPTOR_SUFFIX, SoundEntry};
use crate::error::{Error, Result};
use crate::partition::Partition;
use crate::progress::StageContext;
use crate::stages::decode::bank_name;
use crate::tools::BankDecoder;
use crate::utils::move_file;

/// Group for banks found outside both partitions
pub const OTHER_GROUP: &str = "Other";

/// One sound entry of a bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundFileInfo {
    pub wem_filename: String,
    pub wav_filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl From<&SoundEntry> for SoundFileInfo {
    fn from(entry: &SoundEntry) -> Self {
        Self {
            wem_filename: entry.embedded_filename.clone(),
            wav_filename: format!("{}.wav", entry.embedded_filename),
            source_path: entry.source_path.clone(),
        }
    }
}

/// One bank and its sounds, keyed by ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankInfo {
    pub name: String,
    pub sound_files: IndexMap<String, SoundFileInfo>,
}

impl From<&BankDescriptor> for BankInfo {
    fn from(bank: &BankDescriptor) -> Self {
        Self {
            name: bank.name.clone(),
            sound_files: bank
                .entries()
                .iter()
                .map(|e| (e.id.to_string(), SoundFileInfo::from(e)))
                .collect(),
        }
    }
}

/// The whole index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDictionary {
    /// RFC 3339 local timestamp of when the index was built
    #[serde(default)]
    pub generated_at: String,
    /// Group name (`Shared`, `SharedDev`, `Other`) → bank name → bank,
    /// written as top-level keys of the JSON object
    #[serde(flatten)]
    pub partitions: IndexMap<String, IndexMap<String, BankInfo>>,
}

impl BankDictionary {
    /// Total number of banks across all groups
    #[must_use]
    pub fn bank_count(&self) -> usize {
        self.partitions.values().map(IndexMap::len).sum()
    }

    /// Total number of sound entries across all banks
    #[must_use]
    pub fn sound_count(&self) -> usize {
        self.partitions
            .values()
            .flat_map(IndexMap::values)
            .map(|b| b.sound_files.len())
            .sum()
    }

    /// Write as pretty-printed JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Options for [`build_dictionary`]
#[derive(Debug, Clone)]
pub struct DictionaryOptions {
    /// Partitions to include; banks in other partitions are ignored
    pub partitions: Vec<Partition>,
    /// Keep descriptors under `<dir>/<group>/` instead of deleting them
    pub descriptor_dir: Option<PathBuf>,
    /// Concurrent decoder processes
    pub workers: usize,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        Self {
            partitions: Partition::ALL.to_vec(),
            descriptor_dir: None,
            workers: 4,
        }
    }
}

impl DictionaryOptions {
    #[must_use]
    pub fn with_partitions(mut self, partitions: Vec<Partition>) -> Self {
        self.partitions = partitions;
        self
    }

    #[must_use]
    pub fn with_descriptor_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.descriptor_dir = dir;
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

/// Find every `.bnk` under `root`, grouped by partition.
///
/// Banks that sit in an unselected partition are dropped; banks outside any
/// partition land in [`OTHER_GROUP`]. Empty groups are omitted.
pub fn find_bank_files(root: &Path, partitions: &[Partition]) -> IndexMap<String, Vec<PathBuf>> {
    let mut groups: IndexMap<String, Vec<PathBuf>> = partitions
        .iter()
        .map(|p| (p.as_str().to_string(), Vec::new()))
        .collect();
    groups.insert(OTHER_GROUP.to_string(), Vec::new());

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let path = entry.path();
        let is_bank = entry.file_type().is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("bnk"));
        if !is_bank {
            continue;
        }
        let group = match Partition::from_path(path.strip_prefix(root).unwrap_or(path)) {
            Some(p) if partitions.contains(&p) => p.as_str(),
            Some(_) => continue,
            None => OTHER_GROUP,
        };
        if let Some(files) = groups.get_mut(group) {
            files.push(path.to_path_buf());
        }
    }

    groups.retain(|_, files| !files.is_empty());
    for (group, files) in &groups {
        tracing::info!("Found {} banks in {}", files.len(), group);
    }
    groups
}

/// Decode and index every bank under `unpacked_root`.
///
/// A bank the decoder fails on is still listed, with no sounds. Returns
/// [`Error::Cancelled`] if cancellation is requested mid-run.
pub fn build_dictionary(
    unpacked_root: &Path,
    decoder: &dyn BankDecoder,
    options: &DictionaryOptions,
    ctx: StageContext<'_>,
) -> Result<BankDictionary> {
    if !unpacked_root.is_dir() {
        return Err(Error::InvalidPath(format!(
            "unpacked data folder not found: {}",
            unpacked_root.display()
        )));
    }
    decoder.check_available()?;

    let groups = find_bank_files(unpacked_root, &options.partitions);
    let total: usize = groups.values().map(Vec::len).sum();
    ctx.started(total, format!("{total} banks"));

    let pool = crate::stages::worker_pool(options.workers)?;
    let processed = AtomicUsize::new(0);
    let mut dictionary = BankDictionary {
        generated_at: chrono::Local::now().to_rfc3339(),
        ..BankDictionary::default()
    };

    for (group, files) in &groups {
        let keep_dir = options.descriptor_dir.as_ref().map(|d| d.join(group));
        if let Some(dir) = &keep_dir {
            fs::create_dir_all(dir)?;
        }

        let banks: Vec<BankInfo> = pool.install(|| {
            files
                .par_iter()
                .filter_map(|file| {
                    if ctx.is_cancelled() {
                        return None;
                    }
                    let info = index_bank(decoder, file, keep_dir.as_deref(), ctx);
                    let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    ctx.progress(current, total, info.name.clone());
                    Some(info)
                })
                .collect()
        });

        if ctx.is_cancelled() {
            ctx.cancelled();
            return Err(Error::Cancelled);
        }

        let entry = dictionary.partitions.entry(group.clone()).or_default();
        for bank in banks {
            entry.insert(bank.name.clone(), bank);
        }
    }

    ctx.finished(
        total,
        format!(
            "{} banks, {} sounds",
            dictionary.bank_count(),
            dictionary.sound_count()
        ),
    );
    Ok(dictionary)
}

fn index_bank(
    decoder: &dyn BankDecoder,
    bank: &Path,
    keep_dir: Option<&Path>,
    ctx: StageContext<'_>,
) -> BankInfo {
    let name = bank_name(bank).unwrap_or_default().to_string();
    let empty = |name: String| BankInfo {
        name,
        sound_files: IndexMap::new(),
    };

    let descriptor = match decoder.decode(bank) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Failed to decode {}: {}", bank.display(), e);
            ctx.failed(format!("{name}: {e}"));
            return empty(name);
        }
    };

    let info = match BankDescriptor::from_file(name.clone(), &descriptor) {
        Ok(parsed) => BankInfo::from(&parsed),
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}", descriptor.display(), e);
            ctx.failed(format!("{name}: {e}"));
            empty(name.clone())
        }
    };

    let disposal = match keep_dir {
        Some(dir) => move_file(&descriptor, &dir.join(format!("{name}{DESCRIPTOR_SUFFIX}"))),
        None => fs::remove_file(&descriptor).map_err(Error::from),
    };
    if let Err(e) = disposal {
        tracing::warn!("Could not clean up {}: {}", descriptor.display(), e);
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banks::SoundId;
    use crate::cancel::CancellationToken;
    use crate::progress::{EventSink, Stage};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// Emits a two-sound descriptor for every bank
    struct FakeDecoder;

    impl BankDecoder for FakeDecoder {
        fn decode(&self, bank: &Path) -> Result<PathBuf> {
            let out = PathBuf::from(format!("{}.xml", bank.display()));
            fs::write(
                &out,
                r#"<root><SoundSFX><EmbeddedFile ID="100"/></SoundSFX>
                <SoundSFX><EmbeddedFile ID="101"/></SoundSFX></root>"#,
            )?;
            Ok(out)
        }
    }

    fn layout(root: &Path) {
        for (partition, bank) in [("Shared", "AMB_01"), ("SharedDev", "VO_02")] {
            let dir = root.join(format!("SharedSoundBanks/Public/{partition}/Assets/Sound"));
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(format!("{bank}.bnk")), "").unwrap();
        }
        let loose = root.join("Mods/Loose");
        fs::create_dir_all(&loose).unwrap();
        fs::write(loose.join("MISC_03.bnk"), "").unwrap();
    }

    #[test]
    fn test_find_bank_files_groups() {
        let temp = TempDir::new().unwrap();
        layout(temp.path());

        let all = find_bank_files(temp.path(), &Partition::ALL);
        let keys: Vec<_> = all.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Shared", "SharedDev", "Other"]);

        let shared_only = find_bank_files(temp.path(), &[Partition::Shared]);
        let keys: Vec<_> = shared_only.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Shared", "Other"]);
    }

    #[test]
    fn test_build_dictionary() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("UnpackedData");
        layout(&root);
        let kept = temp.path().join("xml");

        let sink = EventSink::disconnected();
        let cancel = CancellationToken::new();
        let options = DictionaryOptions::default()
            .with_workers(2)
            .with_descriptor_dir(Some(kept.clone()));
        let dict = build_dictionary(
            &root,
            &FakeDecoder,
            &options,
            StageContext::new(Stage::Dictionary, &sink, &cancel),
        )
        .unwrap();

        assert_eq!(dict.bank_count(), 3);
        assert_eq!(dict.sound_count(), 6);
        let amb = &dict.partitions["Shared"]["AMB_01"];
        assert_eq!(amb.sound_files["100"].wem_filename, "100.wem");
        assert_eq!(amb.sound_files["100"].wav_filename, "100.wem.wav");
        assert!(dict.partitions["Other"].contains_key("MISC_03"));
        assert!(kept.join("SharedDev/VO_02.bnk.xml").is_file());

        let path = temp.path().join("out/bg3_sounds.json");
        dict.save(&path).unwrap();
        assert_eq!(BankDictionary::load(&path).unwrap(), dict);
    }

    #[test]
    fn test_groups_are_top_level_keys() {
        let mut dict = BankDictionary {
            generated_at: "2026-01-01T00:00:00+00:00".to_string(),
            ..BankDictionary::default()
        };
        let bank = BankDescriptor::new("AMB_01", vec![SoundEntry::new(SoundId(100))]);
        dict.partitions
            .entry("Shared".to_string())
            .or_default()
            .insert("AMB_01".to_string(), BankInfo::from(&bank));

        let value = serde_json::to_value(&dict).unwrap();
        assert!(value.get("partitions").is_none());
        assert_eq!(
            value["Shared"]["AMB_01"]["sound_files"]["100"]["wav_filename"],
            "100.wem.wav"
        );

        // Files without a timestamp still load
        let plain = r#"{"SharedDev": {"VO_02": {"name": "VO_02", "sound_files": {}}}}"#;
        let loaded: BankDictionary = serde_json::from_str(plain).unwrap();
        assert_eq!(loaded.generated_at, "");
        assert_eq!(loaded.bank_count(), 1);
    }

    #[test]
    fn test_cancelled_build() {
        let temp = TempDir::new().unwrap();
        layout(temp.path());
        let sink = EventSink::disconnected();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = build_dictionary(
            temp.path(),
            &FakeDecoder,
            &DictionaryOptions::default(),
            StageContext::new(Stage::Dictionary, &sink, &cancel),
        );
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
