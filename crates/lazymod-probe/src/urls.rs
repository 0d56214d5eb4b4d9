//! Dataset URL listings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to read url listing: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid url listing at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset `{0}` lists no urls")]
    EmptyEntry(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum UrlEntry {
    One(String),
    Many(Vec<String>),
}

/// Dataset key -> the URLs its download depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DatasetUrls {
    entries: BTreeMap<String, Vec<String>>,
}

impl DatasetUrls {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProbeError> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ProbeError::ReadFile {
            path: label.clone(),
            source,
        })?;
        Self::parse(&text, &label)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ProbeError> {
        Self::parse(text, "<inline>")
    }

    fn parse(text: &str, label: &str) -> Result<Self, ProbeError> {
        let raw: BTreeMap<String, UrlEntry> =
            serde_json::from_str(text).map_err(|source| ProbeError::ParseJson {
                path: label.to_string(),
                source,
            })?;
        let mut entries = BTreeMap::new();
        for (key, entry) in raw {
            let urls = match entry {
                UrlEntry::One(url) => vec![url],
                UrlEntry::Many(urls) => urls,
            };
            if urls.is_empty() {
                return Err(ProbeError::EmptyEntry(key));
            }
            entries.insert(key, urls);
        }
        Ok(Self { entries })
    }

    pub fn insert(&mut self, key: impl Into<String>, urls: Vec<String>) {
        self.entries.insert(key.into(), urls);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, urls)| (key.as_str(), urls.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn url_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
