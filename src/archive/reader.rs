use crate::archive::{Entry, EntryInfo, MANIFEST_NAME};
use crate::error::{DtxError, Result};
use crate::manifest::Manifest;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Read access to a datatext archive
///
/// Entries are reported in the archive's own member order, which is the
/// order the manifest numbers them in.
pub struct ArchiveReader {
    archive: ZipArchive<File>,
    path: PathBuf,
}

impl ArchiveReader {
    /// Open an archive file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DtxError::ArchiveNotFound(path.display().to_string()),
            _ => DtxError::Io(e),
        })?;

        let archive = ZipArchive::new(file).map_err(|e| match e {
            ZipError::Io(io_err) => DtxError::Io(io_err),
            other => DtxError::InvalidFormat(format!("{}: {}", path.display(), other)),
        })?;

        Ok(Self {
            archive,
            path: path.to_path_buf(),
        })
    }

    /// Path this reader was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries, manifest included
    pub fn entry_count(&self) -> usize {
        self.archive.len()
    }

    /// All entry names in archive order, manifest included
    pub fn entry_names(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|index| self.archive.name_for_index(index))
            .map(str::to_string)
            .collect()
    }

    /// Check if an entry exists in the archive
    pub fn contains(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Name and size of every non-manifest entry
    pub fn list_files(&mut self) -> Result<Vec<EntryInfo>> {
        let mut files = Vec::with_capacity(self.archive.len());

        for index in 0..self.archive.len() {
            let file = self.archive.by_index(index)?;
            if file.name() == MANIFEST_NAME {
                continue;
            }
            files.push(EntryInfo {
                name: file.name().to_string(),
                size: file.size(),
            });
        }

        Ok(files)
    }

    /// Read an entry's content
    pub fn read_file(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => DtxError::FileNotFound(name.to_string()),
            other => DtxError::from(other),
        })?;

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read an entry and decode it as UTF-8 text
    pub fn read_text(&mut self, name: &str) -> Result<String> {
        let data = self.read_file(name)?;
        String::from_utf8(data).map_err(|_| DtxError::NotUtf8(name.to_string()))
    }

    /// Read every non-manifest entry, in archive order
    pub fn read_entries(&mut self) -> Result<Vec<Entry>> {
        let mut entries = Vec::with_capacity(self.archive.len());

        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index)?;
            if file.name() == MANIFEST_NAME {
                continue;
            }

            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(Entry { name, data });
        }

        Ok(entries)
    }

    /// Read and parse the `.ids` manifest
    pub fn read_manifest(&mut self) -> Result<Manifest> {
        if !self.contains(MANIFEST_NAME) {
            return Err(DtxError::ManifestNotFound);
        }

        let data = self.read_file(MANIFEST_NAME)?;
        Manifest::from_bytes(&data)
    }
}
