mod reader;
mod writer;

pub use reader::ArchiveReader;
pub use writer::ArchiveWriter;

use crate::error::{DtxError, Result};
use std::fmt;

/// Reserved entry holding the id manifest
pub const MANIFEST_NAME: &str = ".ids";

/// Archive file used when no path is configured
pub const DEFAULT_ARCHIVE_NAME: &str = "data.dtx";

/// A stored file: name plus uncompressed content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
}

impl Entry {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Name and uncompressed size of a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub size: u64,
}

impl fmt::Display for EntryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size)
    }
}

/// Normalize path to forward slashes (cross-platform compatibility)
pub(crate) fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Reject names that cannot be written as a single manifest line
pub(crate) fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DtxError::PathError("Empty entry name".to_string()));
    }
    if name.contains(['\n', '\r']) {
        return Err(DtxError::PathError(format!(
            "Entry name contains a line break: {:?}",
            name
        )));
    }
    Ok(())
}

/// Final component of a slash- or backslash-separated name
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
