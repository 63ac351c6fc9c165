//! Decoded bank descriptors
//!
//! `wwiser` turns a `.bnk` into an XML dump. Two shapes show up in practice:
//!
//! - the full dump, where every sound object carries a field line such as
//!   `<field type="tid" name="sourceID" value="123456"/>`; the ID is the
//!   second-to-last quoted token on that line
//! - the condensed form, where `SoundSFX` elements wrap
//!   `<EmbeddedFile ID="123456"/>` children and `MediaSource` elements name
//!   the original source file
//!
//! The structured form is tried first; when it yields nothing (or is not
//! well-formed XML) the raw lines are scanned for `sourceID` markers instead.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::Result;

/// Markers identifying a source ID field in the line-oriented dump, in the
/// long (`name=`) and short (`na=`, written by `wwiser -d xsl`) forms
pub const SOURCE_ID_MARKERS: [&str; 2] = [r#"name="sourceID""#, r#"na="sourceID""#];

/// Suffix of descriptor files written by the decoder
pub const DESCRIPTOR_SUFFIX: &str = ".bnk.xml";

/// Extension of the transcoded files the pipeline works on
pub const CONVERTED_SUFFIX: &str = ".wem.wav";

/// Wwise source ID of one embedded sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundId(pub u32);

impl SoundId {
    /// Name of the raw `.wem` file for this ID
    #[must_use]
    pub fn wem_filename(self) -> String {
        format!("{}.wem", self.0)
    }

    /// Name of the transcoded file for this ID (`{id}.wem.wav`)
    #[must_use]
    pub fn converted_filename(self) -> String {
        format!("{}{CONVERTED_SUFFIX}", self.0)
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SoundId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(SoundId)
    }
}

/// One sound embedded in (or referenced by) a bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundEntry {
    pub id: SoundId,
    /// Name of the `.wem` file holding the sound's data
    pub embedded_filename: String,
    /// Original authoring path from `MediaSource/SourceFile`, when present
    pub source_path: Option<String>,
}

impl SoundEntry {
    #[must_use]
    pub fn new(id: SoundId) -> Self {
        Self {
            id,
            embedded_filename: id.wem_filename(),
            source_path: None,
        }
    }
}

/// A parsed sound bank: its name and the distinct sounds it references,
/// in descriptor order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankDescriptor {
    pub name: String,
    /// Descriptor files this bank was read from
    pub sources: Vec<PathBuf>,
    entries: Vec<SoundEntry>,
}

impl BankDescriptor {
    /// Build a descriptor, keeping only the first entry for each ID
    #[must_use]
    pub fn new(name: impl Into<String>, entries: Vec<SoundEntry>) -> Self {
        let mut unique: IndexMap<SoundId, SoundEntry> = IndexMap::new();
        for entry in entries {
            match unique.get_mut(&entry.id) {
                Some(existing) => {
                    if existing.source_path.is_none() {
                        existing.source_path = entry.source_path;
                    }
                }
                None => {
                    unique.insert(entry.id, entry);
                }
            }
        }
        Self {
            name: name.into(),
            sources: Vec::new(),
            entries: unique.into_values().collect(),
        }
    }

    /// Read and parse one descriptor file
    pub fn from_file(name: impl Into<String>, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut bank = Self::new(name, parse_descriptor(&content));
        bank.sources.push(path.to_path_buf());
        Ok(bank)
    }

    /// Append another descriptor's entries (same bank split over files)
    pub fn merge(&mut self, other: BankDescriptor) {
        let mut entries = std::mem::take(&mut self.entries);
        entries.extend(other.entries);
        let merged = Self::new(std::mem::take(&mut self.name), entries);
        self.name = merged.name;
        self.entries = merged.entries;
        self.sources.extend(other.sources);
    }

    #[must_use]
    pub fn entries(&self) -> &[SoundEntry] {
        &self.entries
    }

    pub fn sound_ids(&self) -> impl Iterator<Item = SoundId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// IDs as strings matching converted filename stems
    #[must_use]
    pub fn id_set(&self) -> IndexSet<String> {
        self.sound_ids().map(|id| id.to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bank name for a descriptor file: the file name up to its first `.`
#[must_use]
pub fn bank_name_from_descriptor(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.split('.').next()?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Parse descriptor content, structured form first with a raw-text fallback.
#[must_use]
pub fn parse_descriptor(content: &str) -> Vec<SoundEntry> {
    match parse_descriptor_xml(content) {
        Ok(entries) if !entries.is_empty() => entries,
        Ok(_) => parse_descriptor_text(content),
        Err(e) => {
            tracing::debug!("Descriptor is not well-formed XML ({}), scanning raw lines", e);
            parse_descriptor_text(content)
        }
    }
}

/// Scan raw lines for `name="sourceID"` or `na="sourceID"` markers.
///
/// The ID is the second-to-last `"`-delimited token of the line. Tokens that
/// are not numeric are skipped.
#[must_use]
pub fn parse_descriptor_text(content: &str) -> Vec<SoundEntry> {
    content
        .lines()
        .filter(|line| SOURCE_ID_MARKERS.iter().any(|m| line.contains(m)))
        .filter_map(|line| {
            let token = line.rsplit('"').nth(1)?;
            match token.parse::<SoundId>() {
                Ok(id) => Some(SoundEntry::new(id)),
                Err(_) => {
                    tracing::debug!("Ignoring non-numeric sourceID token '{}'", token);
                    None
                }
            }
        })
        .collect()
}

/// Parse the condensed XML form: `SoundSFX//EmbeddedFile[@ID]`, enriched with
/// `MediaSource[@ID]/SourceFile` text.
pub fn parse_descriptor_xml(content: &str) -> Result<Vec<SoundEntry>> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut entries = Vec::new();
    let mut source_paths: IndexMap<SoundId, String> = IndexMap::new();

    let mut sfx_depth = 0usize;
    let mut media_source: Option<SoundId> = None;
    let mut in_source_file = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"SoundSFX" => sfx_depth += 1,
                b"EmbeddedFile" if sfx_depth > 0 => {
                    if let Some(id) = id_attribute(&e)? {
                        entries.push(SoundEntry::new(id));
                    }
                }
                b"MediaSource" => media_source = id_attribute(&e)?,
                b"SourceFile" => in_source_file = media_source.is_some(),
                _ => {}
            },
            Event::Empty(e) => {
                if e.name().as_ref() == b"EmbeddedFile"
                    && sfx_depth > 0
                    && let Some(id) = id_attribute(&e)?
                {
                    entries.push(SoundEntry::new(id));
                }
            }
            Event::Text(t) if in_source_file => {
                if let Some(id) = media_source {
                    let text = t.unescape()?;
                    source_paths.insert(id, text.into_owned());
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"SoundSFX" => sfx_depth = sfx_depth.saturating_sub(1),
                b"MediaSource" => media_source = None,
                b"SourceFile" => in_source_file = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    for entry in &mut entries {
        if let Some(path) = source_paths.get(&entry.id) {
            entry.source_path = Some(path.clone());
        }
    }
    Ok(entries)
}

fn id_attribute(e: &BytesStart<'_>) -> Result<Option<SoundId>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"ID" {
            let value = String::from_utf8_lossy(&attr.value);
            return Ok(value.parse().ok());
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEXT_DUMP: &str = r#"<root>
  <object name="CAkSound" index="1">
    <field type="tid" name="sourceID" value="100"/>
  </object>
  <object name="CAkSound" index="2">
    <field type="tid" name="sourceID" value="200"/>
    <field type="tid" name="sourceID" value="100"/>
  </object>
  <field type="str" name="other" value="x"/>
</root>
"#;

    const CONDENSED: &str = r#"<Bank name="AMB_01">
  <SoundSFX name="Wind">
    <EmbeddedFile ID="300"/>
    <Nested><EmbeddedFile ID="301"></EmbeddedFile></Nested>
  </SoundSFX>
  <EmbeddedFile ID="999"/>
  <MediaSource ID="301">
    <SourceFile>SFX\Amb\wind_gust.wav</SourceFile>
  </MediaSource>
</Bank>
"#;

    fn ids(entries: &[SoundEntry]) -> Vec<u32> {
        entries.iter().map(|e| e.id.0).collect()
    }

    #[test]
    fn test_short_field_names_from_wwiser() {
        let dump = r#"<base>
  <obj na="CAkSound" ix="1">
    <fld ty="tid" na="sourceID" va="100"/>
  </obj>
  <obj na="CAkSound" ix="2">
    <fld ty="tid" na="sourceID" va="101"/>
    <fld ty="u32" na="ulID" va="555"/>
  </obj>
</base>
"#;
        assert_eq!(ids(&parse_descriptor(dump)), vec![100, 101]);
        assert_eq!(ids(&parse_descriptor_text(dump)), vec![100, 101]);
    }

    #[test]
    fn test_text_dump_falls_back_to_lines() {
        let entries = parse_descriptor(TEXT_DUMP);
        assert_eq!(ids(&entries), vec![100, 200, 100]);

        let bank = BankDescriptor::new("AMB_01", entries);
        assert_eq!(bank.id_set().into_iter().collect::<Vec<_>>(), vec!["100", "200"]);
    }

    #[test]
    fn test_condensed_xml() {
        let entries = parse_descriptor(CONDENSED);
        assert_eq!(ids(&entries), vec![300, 301]);
        assert_eq!(entries[0].embedded_filename, "300.wem");
        assert_eq!(entries[1].source_path.as_deref(), Some(r"SFX\Amb\wind_gust.wav"));
    }

    #[test]
    fn test_malformed_xml_uses_text_fallback() {
        let content = "<broken <field name=\"sourceID\" value=\"42\"/>\n<<<";
        assert_eq!(ids(&parse_descriptor(content)), vec![42]);
    }

    #[test]
    fn test_non_numeric_ids_are_skipped() {
        let content = "<field name=\"sourceID\" value=\"abc\"/>\n<field name=\"sourceID\" value=\"7\"/>";
        assert_eq!(ids(&parse_descriptor_text(content)), vec![7]);
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let mut a = BankDescriptor::new("B", vec![SoundEntry::new(SoundId(1)), SoundEntry::new(SoundId(2))]);
        let b = BankDescriptor::new("B", vec![SoundEntry::new(SoundId(2)), SoundEntry::new(SoundId(3))]);
        a.merge(b);
        assert_eq!(a.name, "B");
        assert_eq!(a.sound_ids().map(|id| id.0).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_bank_name_from_descriptor() {
        assert_eq!(
            bank_name_from_descriptor(Path::new("/x/AMB_01.bnk.xml")).as_deref(),
            Some("AMB_01")
        );
        assert_eq!(bank_name_from_descriptor(Path::new("/x/.bnk.xml")), None);
    }

    #[test]
    fn test_converted_filename() {
        assert_eq!(SoundId(100).converted_filename(), "100.wem.wav");
    }
}
