//! Sound ID → display name tables
//!
//! Wiki pages list each logical sound as a row of three cells: a row index, a
//! base name, and the comma-separated Wwise source IDs that make up the
//! sound. Scraped to plain text, each cell lands on its own line:
//!
//! ```text
//! 1
//! Footsteps
//! 100, 101
//! ```
//!
//! Every ID becomes `{base}_{position}`, so the example yields
//! `100 → Footsteps_0` and `101 → Footsteps_1`.

use std::collections::HashMap;

/// Mapping from raw sound ID (as it appears in filenames) to display name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    entries: HashMap<String, String>,
}

impl IdMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one entry. A later insert for the same ID replaces the earlier
    /// one, so duplicate IDs on a page resolve to the last row listing them.
    pub fn insert(&mut self, id: impl Into<String>, display_name: impl Into<String>) {
        self.entries.insert(id.into(), display_name.into());
    }

    /// Add every ID of one row as `{base_name}_{idx}`
    fn insert_row<'a>(&mut self, base_name: &str, ids: impl Iterator<Item = &'a str>) {
        let ids = ids.map(str::trim).filter(|id| !id.is_empty());
        for (idx, id) in ids.enumerate() {
            self.insert(id, format!("{base_name}_{idx}"));
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by ID, for stable display
    #[must_use]
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }
}

impl FromIterator<(String, String)> for IdMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Build an ID map from scraped plain-text page content.
///
/// Rows start at the first line made only of ASCII digits. A page without
/// any such line is read from its first line, which usually produces a
/// sparse or nonsensical map; malformed pages are never an error.
#[must_use]
pub fn build_id_map(content: &str) -> IdMap {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let start = lines.iter().position(|line| is_row_index(line)).unwrap_or(0);

    let mut map = IdMap::new();
    for group in lines[start..].chunks_exact(3) {
        let (base_name, ids) = (group[1], group[2]);
        map.insert_row(base_name, ids.split(','));
    }
    map
}

/// Build an ID map from a markdown wiki page.
///
/// Only rows of the form `| <index> | <name> | <id>, <id>, ... |` count;
/// headers, separators and prose are ignored.
#[must_use]
pub fn build_id_map_from_markdown(content: &str) -> IdMap {
    let mut map = IdMap::new();
    for line in content.lines() {
        if let Some((base_name, ids)) = parse_table_row(line.trim()) {
            map.insert_row(base_name, ids.split(','));
        }
    }
    map
}

fn is_row_index(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

fn parse_table_row(line: &str) -> Option<(&str, &str)> {
    let inner = line.strip_prefix('|')?.strip_suffix('|')?;
    let mut cells = inner.split('|').map(str::trim);

    let index = cells.next()?;
    let base_name = cells.next()?;
    let ids = cells.next()?;
    if cells.next().is_some() || !is_row_index(index) {
        return None;
    }
    let is_word = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !is_word(base_name) {
        return None;
    }
    Some((base_name, ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map_of(pairs: &[(&str, &str)]) -> IdMap {
        pairs
            .iter()
            .map(|(id, name)| ((*id).to_string(), (*name).to_string()))
            .collect()
    }

    #[test]
    fn test_single_row() {
        let map = build_id_map("1\nFootsteps\n100, 101\n");
        assert_eq!(map, map_of(&[("100", "Footsteps_0"), ("101", "Footsteps_1")]));
    }

    #[test]
    fn test_header_text_before_first_index() {
        let content = "AMB_PS_SPECIFIC\n\n#\nName\nIDs\n1\nWind\n10,11,12\n2\nRain\n  20  \n";
        let map = build_id_map(content);
        assert_eq!(
            map,
            map_of(&[
                ("10", "Wind_0"),
                ("11", "Wind_1"),
                ("12", "Wind_2"),
                ("20", "Rain_0"),
            ])
        );
    }

    #[test]
    fn test_entry_count_matches_ids_per_row() {
        let content = "1\nA\n1, 2, 3\n2\nB\n4\n3\nC\n5, 6\n";
        assert_eq!(build_id_map(content).len(), 6);
    }

    #[test]
    fn test_trailing_partial_group_is_ignored() {
        let map = build_id_map("1\nA\n100\n2\nB\n");
        assert_eq!(map, map_of(&[("100", "A_0")]));
    }

    #[test]
    fn test_duplicate_id_last_row_wins() {
        let map = build_id_map("1\nFirst\n100\n2\nSecond\n200, 100\n");
        assert_eq!(map.get("100"), Some("Second_1"));
        assert_eq!(map.get("200"), Some("Second_0"));
    }

    #[test]
    fn test_empty_tokens_do_not_shift_positions() {
        let map = build_id_map("1\nA\n100,, 101,\n");
        assert_eq!(map, map_of(&[("100", "A_0"), ("101", "A_1")]));
    }

    #[test]
    fn test_no_index_line_reads_from_start() {
        let map = build_id_map("Title\nName\n7, 8\n");
        assert_eq!(map, map_of(&[("7", "Name_0"), ("8", "Name_1")]));
    }

    #[test]
    fn test_empty_content() {
        assert!(build_id_map("").is_empty());
        assert!(build_id_map("\n  \n").is_empty());
    }

    #[test]
    fn test_markdown_rows() {
        let content = "\
# AMB_PS_SPECIFIC

| # | Name | IDs |
|---|------|-----|
| 1 | Wind_Loop | 10, 11 |
| 2 | Rain | 20 |
| x | Bad | 30 |
";
        let map = build_id_map_from_markdown(content);
        assert_eq!(
            map,
            map_of(&[("10", "Wind_Loop_0"), ("11", "Wind_Loop_1"), ("20", "Rain_0")])
        );
    }

    #[test]
    fn test_sorted_is_stable() {
        let map = build_id_map("1\nA\n30, 10, 20\n");
        assert_eq!(map.sorted(), vec![("10", "A_1"), ("20", "A_2"), ("30", "A_0")]);
    }
}
