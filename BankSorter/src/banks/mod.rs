//! Sound bank descriptors
//!
//! A descriptor is the XML dump `wwiser` produces for one `.bnk`. This module
//! reads descriptors back into [`BankDescriptor`]s, scans a partition's
//! decoded-bank tree, and builds the optional bank dictionary.

pub mod descriptor;
pub mod dictionary;
pub mod scanner;

pub use descriptor::{
    BankDescriptor, CONVERTED_SUFFIX, DESCRIPTOR_SUFFIX, SOURCE_ID_MARKERS, SoundEntry, SoundId,
    bank_name_from_descriptor, parse_descriptor, parse_descriptor_text, parse_descriptor_xml,
};
pub use dictionary::{
    BankDictionary, BankInfo, DictionaryOptions, OTHER_GROUP, SoundFileInfo, build_dictionary,
    find_bank_files,
};
pub use scanner::{BankScan, find_descriptor_files, scan_banks};
