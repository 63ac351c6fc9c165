//! Knowledge base snapshot loading and page lookup

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::id_map::{IdMap, build_id_map, build_id_map_from_markdown};
use crate::error::{Error, Result};

/// How a page's content is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    /// Scraped plain text, one table cell per line
    #[default]
    Text,
    /// Raw markdown with `| index | name | ids |` table rows
    Markdown,
}

/// One wiki page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBasePage {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "is_text")]
    pub format: PageFormat,
}

fn is_text(format: &PageFormat) -> bool {
    *format == PageFormat::Text
}

impl KnowledgeBasePage {
    /// Parse this page into an ID map according to its format
    #[must_use]
    pub fn id_map(&self) -> IdMap {
        match self.format {
            PageFormat::Text => build_id_map(&self.content),
            PageFormat::Markdown => build_id_map_from_markdown(&self.content),
        }
    }
}

/// Page key → page, in snapshot order
///
/// Order matters: [`KnowledgeBase::find_page`] returns the first match, and
/// the snapshot's own key order is what decides ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    pages: IndexMap<String, KnowledgeBasePage>,
}

impl KnowledgeBase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a `wiki_data.json` snapshot (`{key: {url, content}}`)
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::KnowledgeBaseMissing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let kb: Self = serde_json::from_str(&content)?;
        tracing::info!("Loaded {} knowledge base pages from {}", kb.len(), path.display());
        Ok(kb)
    }

    /// Load a folder of `*.bnk.md` wiki pages, keyed by file name.
    ///
    /// Files are read in name order so lookups are deterministic.
    pub fn load_markdown_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::KnowledgeBaseMissing(dir.to_path_buf()));
        }

        let mut files: Vec<_> = fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with(".bnk.md"))
            })
            .collect();
        files.sort();

        let mut kb = Self::new();
        for file in files {
            let Some(key) = file.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
                continue;
            };
            match fs::read_to_string(&file) {
                Ok(content) => kb.insert(
                    key,
                    KnowledgeBasePage {
                        url: file.to_string_lossy().into_owned(),
                        content,
                        format: PageFormat::Markdown,
                    },
                ),
                Err(e) => tracing::warn!("Skipping unreadable wiki page {}: {}", file.display(), e),
            }
        }
        tracing::info!("Loaded {} markdown wiki pages from {}", kb.len(), dir.display());
        Ok(kb)
    }

    /// Load a snapshot from either a JSON file or a markdown directory
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::load_markdown_dir(path)
        } else {
            Self::load_json(path)
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, page: KnowledgeBasePage) {
        self.pages.insert(key.into(), page);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KnowledgeBasePage> {
        self.pages.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Find the page for a bank folder.
    ///
    /// Linear scan in snapshot order; the first key that contains
    /// `folder_name` (case-insensitive, Unicode uppercase) wins. Several keys may match,
    /// uniqueness is not assumed.
    #[must_use]
    pub fn find_page(&self, folder_name: &str) -> Option<(&str, &KnowledgeBasePage)> {
        if folder_name.is_empty() {
            return None;
        }
        let needle = folder_name.to_uppercase();
        self.pages
            .iter()
            .find(|(key, _)| key.to_uppercase().contains(&needle))
            .map(|(key, page)| (key.as_str(), page))
    }
}
