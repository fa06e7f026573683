//! Manifest support for datatext archives
//!
//! # Manifest Scope
//!
//! The manifest is the reserved `.ids` entry. It is plain UTF-8 text with
//! one line per stored file:
//!
//! ```text
//! 1: notes.txt
//! 2: main.rs
//! ```
//!
//! Ids are positions, not stable identifiers. The whole manifest is
//! recomputed from the archive's member order every time a file is added
//! or removed, so an id may point at a different file after a mutation.
//!
//! # Usage
//!
//! ```
//! use datatext::Manifest;
//!
//! let manifest = Manifest::from_names(["notes.txt", "main.rs"]);
//! assert_eq!(manifest.to_text(), "1: notes.txt\n2: main.rs\n");
//!
//! let parsed = Manifest::parse("1: notes.txt\n2: main.rs\n").unwrap();
//! assert_eq!(parsed.lookup(2), Some("main.rs"));
//! ```

use crate::error::{DtxError, Result};
use std::collections::{BTreeMap, HashSet};

/// Separator between id and filename on a manifest line
const LINE_SEPARATOR: &str = ": ";

/// One manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 1-based position of the file in the archive
    pub id: u32,

    /// Stored filename
    pub name: String,
}

/// Parsed `.ids` manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Number names sequentially from 1 in the order given
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names
            .into_iter()
            .zip(1u32..)
            .map(|(name, id)| ManifestEntry {
                id,
                name: name.into(),
            })
            .collect();

        Self { entries }
    }

    /// Parse manifest text
    ///
    /// Each non-blank line must be `<id>: <name>`. The line is split on the
    /// first separator, so filenames may themselves contain `": "`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let (id, name) = line
                .split_once(LINE_SEPARATOR)
                .ok_or_else(|| DtxError::InvalidManifest {
                    line: line_no,
                    reason: format!("expected '<id>: <name>', got '{}'", line),
                })?;

            let id: u32 = id.trim().parse().map_err(|_| DtxError::InvalidManifest {
                line: line_no,
                reason: format!("invalid id '{}'", id),
            })?;

            if !seen.insert(id) {
                return Err(DtxError::InvalidManifest {
                    line: line_no,
                    reason: format!("duplicate id {}", id),
                });
            }

            entries.push(ManifestEntry {
                id,
                name: name.to_string(),
            });
        }

        Ok(Self { entries })
    }

    /// Parse manifest bytes as read from the archive
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|_| DtxError::NotUtf8(crate::archive::MANIFEST_NAME.to_string()))?;
        Self::parse(text)
    }

    /// Serialize to manifest text, one `\n`-terminated line per entry
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}{}{}\n", entry.id, LINE_SEPARATOR, entry.name))
            .collect()
    }

    /// Filename stored under `id`
    pub fn lookup(&self, id: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.as_str())
    }

    /// Id currently assigned to `name`
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }

    /// Id to filename mapping, ordered by id
    pub fn to_map(&self) -> BTreeMap<u32, String> {
        self.entries
            .iter()
            .map(|entry| (entry.id, entry.name.clone()))
            .collect()
    }

    /// True when ids are exactly `1..=len` with no gaps or duplicates
    pub fn is_dense(&self) -> bool {
        let ids: HashSet<u32> = self.entries.iter().map(|entry| entry.id).collect();
        ids.len() == self.entries.len()
            && (1..=self.entries.len() as u32).all(|id| ids.contains(&id))
    }
}
