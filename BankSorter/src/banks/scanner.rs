//! Discovery of decoded bank descriptors
//!
//! Layout of one partition of the converted-banks tree:
//!
//! ```text
//! ConvertedBanks/Shared/
//! ├── AMB_01/AMB_01.bnk.xml
//! ├── VOX_NARRATOR/VOX_NARRATOR.bnk.xml
//! └── MUS_COMBAT.bnk.xml        (flat layout, also accepted)
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;

use super::descriptor::{BankDescriptor, DESCRIPTOR_SUFFIX, bank_name_from_descriptor};
use crate::error::Result;

/// Result of scanning one partition
#[derive(Debug, Clone, Default)]
pub struct BankScan {
    /// Banks in name order
    pub banks: Vec<BankDescriptor>,
    /// Descriptor files that could not be read, with the reason
    pub unreadable: Vec<(PathBuf, String)>,
}

impl BankScan {
    /// Total number of distinct (bank, id) pairs
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.banks.iter().map(BankDescriptor::len).sum()
    }
}

fn is_descriptor(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(DESCRIPTOR_SUFFIX))
}

/// Find every descriptor below `banks_dir`, paired with its bank name.
///
/// A descriptor inside an immediate subdirectory belongs to the bank named
/// after that subdirectory; one lying directly in `banks_dir` is named after
/// its own file. Results are sorted by path.
pub fn find_descriptor_files(banks_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(banks_dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if !is_descriptor(path) {
            continue;
        }
        let bank_name = if entry.depth() == 1 {
            bank_name_from_descriptor(path)
        } else {
            path.parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str())
                .map(str::to_owned)
        };
        match bank_name {
            Some(name) => found.push((name, path.to_path_buf())),
            None => tracing::warn!("Cannot derive a bank name for {}", path.display()),
        }
    }
    Ok(found)
}

/// Scan a partition's decoded-bank directory.
///
/// A missing directory yields an empty scan. Descriptors that cannot be read
/// are reported in [`BankScan::unreadable`] and skipped; several descriptors
/// for the same bank are merged.
pub fn scan_banks(banks_dir: &Path) -> Result<BankScan> {
    if !banks_dir.is_dir() {
        tracing::info!("No decoded banks at {}", banks_dir.display());
        return Ok(BankScan::default());
    }

    let mut banks: IndexMap<String, BankDescriptor> = IndexMap::new();
    let mut unreadable = Vec::new();

    for (name, path) in find_descriptor_files(banks_dir)? {
        match BankDescriptor::from_file(name.clone(), &path) {
            Ok(bank) => {
                tracing::debug!("Bank {} references {} sounds", name, bank.len());
                match banks.get_mut(&name) {
                    Some(existing) => existing.merge(bank),
                    None => {
                        banks.insert(name, bank);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable descriptor {}: {}", path.display(), e);
                unreadable.push((path, e.to_string()));
            }
        }
    }

    banks.sort_keys();
    Ok(BankScan {
        banks: banks.into_values().collect(),
        unreadable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn descriptor(ids: &[u32]) -> String {
        let mut xml = String::from("<root>\n");
        for id in ids {
            xml.push_str(&format!("  <field type=\"tid\" name=\"sourceID\" value=\"{id}\"/>\n"));
        }
        xml.push_str("</root>\n");
        xml
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let scan = scan_banks(&temp.path().join("nope")).unwrap();
        assert!(scan.banks.is_empty());
    }

    #[test]
    fn test_folder_and_flat_layouts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("VOX_B")).unwrap();
        fs::create_dir_all(root.join("AMB_A")).unwrap();
        fs::create_dir_all(root.join("EMPTY")).unwrap();
        fs::write(root.join("VOX_B/VOX_B.bnk.xml"), descriptor(&[5, 6])).unwrap();
        fs::write(root.join("AMB_A/AMB_A.bnk.xml"), descriptor(&[1])).unwrap();
        fs::write(root.join("MUS_C.bnk.xml"), descriptor(&[9, 9, 8])).unwrap();
        fs::write(root.join("AMB_A/readme.txt"), "not a descriptor").unwrap();

        let scan = scan_banks(root).unwrap();
        let names: Vec<_> = scan.banks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["AMB_A", "MUS_C", "VOX_B"]);
        assert_eq!(scan.banks[1].id_set().into_iter().collect::<Vec<_>>(), vec!["9", "8"]);
        assert_eq!(scan.total_entries(), 5);
    }

    #[test]
    fn test_split_descriptors_merge() {
        let temp = TempDir::new().unwrap();
        let bank = temp.path().join("AMB_A");
        fs::create_dir_all(&bank).unwrap();
        fs::write(bank.join("AMB_A.bnk.xml"), descriptor(&[1, 2])).unwrap();
        fs::write(bank.join("AMB_A_extra.bnk.xml"), descriptor(&[2, 3])).unwrap();

        let scan = scan_banks(temp.path()).unwrap();
        assert_eq!(scan.banks.len(), 1);
        assert_eq!(scan.banks[0].len(), 3);
        assert_eq!(scan.banks[0].sources.len(), 2);
    }

    #[test]
    fn test_unreadable_descriptor_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("BAD")).unwrap();
        fs::write(temp.path().join("BAD/BAD.bnk.xml"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        fs::write(temp.path().join("OK.bnk.xml"), descriptor(&[1])).unwrap();

        let scan = scan_banks(temp.path()).unwrap();
        assert_eq!(scan.banks.len(), 1);
        assert_eq!(scan.banks[0].name, "OK");
        assert_eq!(scan.unreadable.len(), 1);
    }
}
