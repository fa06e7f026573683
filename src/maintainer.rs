//! Manifest maintenance
//!
//! Every mutation of an archive ends by rewriting it through
//! [`write_archive`]: data entries keep their order and bytes, and a fresh
//! `.ids` manifest numbers them `1..=N` in that order.

use crate::archive::{ArchiveReader, ArchiveWriter, Entry};
use crate::error::Result;
use crate::manifest::Manifest;
use std::path::Path;

/// Recompute the manifest of an existing archive
///
/// Callers mutating a shared archive should hold
/// [`ArchiveLock::exclusive`](crate::lock::ArchiveLock::exclusive).
pub fn rebuild_manifest(path: &Path) -> Result<Manifest> {
    let entries = ArchiveReader::open(path)?.read_entries()?;
    write_archive(path, &entries)
}

/// Replace the archive at `path` with `entries` plus a freshly numbered manifest
pub fn write_archive(path: &Path, entries: &[Entry]) -> Result<Manifest> {
    let manifest = Manifest::from_names(entries.iter().map(|entry| entry.name.clone()));

    let mut writer = ArchiveWriter::create(path)?;
    writer.add_manifest(&manifest)?;
    for entry in entries {
        writer.add_file(&entry.name, &entry.data)?;
    }
    writer.finalize()?;

    tracing::debug!(
        archive = %path.display(),
        files = manifest.len(),
        "Rebuilt manifest"
    );

    Ok(manifest)
}
