//! Archive editing operations
//!
//! [`DtxArchive`] is a handle on an archive path. It keeps no state between
//! calls: every operation re-opens the file, and every mutation ends with a
//! manifest rebuild through [`maintainer::write_archive`].

use crate::archive::{
    base_name, normalize_path, validate_entry_name, ArchiveReader, Entry, EntryInfo, MANIFEST_NAME,
};
use crate::error::{DtxError, Result};
use crate::lock::ArchiveLock;
use crate::maintainer;
use crate::manifest::{Manifest, ManifestEntry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A datatext archive on disk
#[derive(Debug, Clone)]
pub struct DtxArchive {
    path: PathBuf,
}

impl DtxArchive {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Open the archive at `path`, creating an empty one if none exists
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let archive = Self::new(path);
        if !archive.exists() {
            archive.create()?;
        }
        Ok(archive)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create a new archive holding only an empty manifest
    pub fn create(&self) -> Result<()> {
        let _lock = ArchiveLock::exclusive(&self.path)?;
        if self.exists() {
            return Err(DtxError::ArchiveExists(self.path.display().to_string()));
        }

        maintainer::write_archive(&self.path, &[])?;
        info!(archive = %self.path.display(), "Created archive");
        Ok(())
    }

    /// Store a file from disk under its base filename
    pub fn add_file(&self, source: &Path) -> Result<ManifestEntry> {
        let name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                DtxError::PathError(format!("No usable file name in {}", source.display()))
            })?;

        let data = fs::read(source)?;
        self.add_bytes(name, &data)
    }

    /// Store `data` under `name` and renumber the manifest
    ///
    /// An existing entry with the same name is replaced.
    pub fn add_bytes(&self, name: &str, data: &[u8]) -> Result<ManifestEntry> {
        let name = normalize_path(name);
        if name == MANIFEST_NAME {
            return Err(DtxError::ReservedName(name));
        }
        validate_entry_name(&name)?;

        let _lock = ArchiveLock::exclusive(&self.path)?;
        let mut entries = self.reader()?.read_entries()?;

        if let Some(position) = entries.iter().position(|entry| entry.name == name) {
            warn!(name = %name, "File already exists in archive, replacing its content");
            entries.remove(position);
        }
        entries.push(Entry::new(name.clone(), data));

        let manifest = maintainer::write_archive(&self.path, &entries)?;
        let id = manifest
            .id_of(&name)
            .ok_or_else(|| DtxError::FileNotFound(name.clone()))?;

        info!(name = %name, id, size = data.len(), "Added file");
        Ok(ManifestEntry { id, name })
    }

    /// Remove the entry named exactly `name` and renumber the manifest
    ///
    /// Returns `false` when no entry matched; the archive is left untouched
    /// in that case.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let _lock = ArchiveLock::exclusive(&self.path)?;
        let entries = self.reader()?.read_entries()?;

        let base = base_name(name);
        let mut removed = false;
        let mut warned = false;
        let mut kept = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.name == name {
                removed = true;
                continue;
            }
            if entry.name == base && !warned {
                warn!(
                    name = %entry.name,
                    requested = %name,
                    "Duplicate name found in the archive"
                );
                warned = true;
            }
            kept.push(entry);
        }

        if !removed {
            info!(name = %name, "No such file in archive");
            return Ok(false);
        }

        maintainer::write_archive(&self.path, &kept)?;
        info!(name = %name, remaining = kept.len(), "Removed file");
        Ok(true)
    }

    /// Write the text of file `id` to `output`, returning the stored name
    pub fn save(&self, id: u32, output: &Path) -> Result<String> {
        let (name, text) = {
            let _lock = ArchiveLock::shared(&self.path)?;
            let mut reader = self.reader()?;
            let manifest = reader.read_manifest()?;
            let name = manifest
                .lookup(id)
                .ok_or(DtxError::UnknownId(id))?
                .to_string();
            let text = reader.read_text(&name)?;
            (name, text)
        };

        fs::write(output, text)?;
        info!(id, name = %name, output = %output.display(), "Saved file");
        Ok(name)
    }

    /// Name and size of every stored file
    pub fn list(&self) -> Result<Vec<EntryInfo>> {
        let _lock = ArchiveLock::shared(&self.path)?;
        self.reader()?.list_files()
    }

    /// Current manifest as stored in the archive
    pub fn manifest(&self) -> Result<Manifest> {
        let _lock = ArchiveLock::shared(&self.path)?;
        self.reader()?.read_manifest()
    }

    /// Renumber the manifest without changing any file
    pub fn reindex(&self) -> Result<Manifest> {
        let _lock = ArchiveLock::exclusive(&self.path)?;
        let manifest = maintainer::rebuild_manifest(&self.path)?;
        info!(archive = %self.path.display(), files = manifest.len(), "Reindexed archive");
        Ok(manifest)
    }

    fn reader(&self) -> Result<ArchiveReader> {
        ArchiveReader::open(&self.path)
    }
}
