use crate::archive::{normalize_path, validate_entry_name, MANIFEST_NAME};
use crate::error::{DtxError, Result};
use crate::manifest::Manifest;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, PersistError};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive writer that stages a complete archive before replacing the target
///
/// All entries are written to a temporary file in the destination's
/// directory. `finalize` renames it over the destination in one step, so
/// readers see either the old archive or the new one. A writer dropped
/// without `finalize` removes its staged file.
pub struct ArchiveWriter {
    zip: ZipWriter<NamedTempFile>,
    destination: PathBuf,
    names: HashSet<String>,
}

impl ArchiveWriter {
    /// Start staging a new archive that will replace `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let destination = path.as_ref().to_path_buf();
        let file_name = destination
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                DtxError::PathError(format!("Not a file path: {}", destination.display()))
            })?;

        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let staged = tempfile::Builder::new()
            .prefix(&format!("temp_{}", file_name))
            .suffix(".tmp")
            .tempfile_in(&dir)?;

        tracing::debug!(
            staged = %staged.path().display(),
            destination = %destination.display(),
            "Staging archive"
        );

        Ok(Self {
            zip: ZipWriter::new(staged),
            destination,
            names: HashSet::new(),
        })
    }

    /// Add a data file
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let name = normalize_path(name);
        if name == MANIFEST_NAME {
            return Err(DtxError::ReservedName(name));
        }
        self.write_entry(name, data)
    }

    /// Write the `.ids` manifest entry
    pub fn add_manifest(&mut self, manifest: &Manifest) -> Result<()> {
        self.write_entry(MANIFEST_NAME.to_string(), manifest.to_text().as_bytes())
    }

    fn write_entry(&mut self, name: String, data: &[u8]) -> Result<()> {
        validate_entry_name(&name)?;
        if !self.names.insert(name.clone()) {
            return Err(DtxError::DuplicateEntry(name));
        }

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(data)?;

        Ok(())
    }

    /// Finish the archive and atomically move it over the destination
    pub fn finalize(self) -> Result<()> {
        let destination = self.destination;
        let staged = self.zip.finish()?;
        staged.as_file().sync_all()?;

        staged
            .persist(&destination)
            .map_err(|e| persist_error(&destination, e))?;

        Ok(())
    }
}

fn persist_error(destination: &Path, err: PersistError) -> DtxError {
    tracing::warn!(
        staged = %err.file.path().display(),
        "Discarding staged archive"
    );
    match err.error.kind() {
        io::ErrorKind::PermissionDenied => {
            DtxError::PermissionDenied(destination.display().to_string())
        }
        io::ErrorKind::NotFound => DtxError::ArchiveNotFound(destination.display().to_string()),
        _ => DtxError::Io(err.error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveReader;

    fn staged_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_finalize_replaces_destination() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data.dtx");
        std::fs::write(&path, b"old content")?;

        let mut writer = ArchiveWriter::create(&path)?;
        writer.add_manifest(&Manifest::from_names(["hello.txt"]))?;
        writer.add_file("hello.txt", b"hello")?;
        writer.finalize()?;

        let mut reader = ArchiveReader::open(&path)?;
        assert_eq!(reader.read_text("hello.txt")?, "hello");
        assert_eq!(reader.read_text(MANIFEST_NAME)?, "1: hello.txt\n");
        assert!(staged_files(dir.path()).is_empty());

        Ok(())
    }

    #[test]
    fn test_drop_without_finalize_cleans_up() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data.dtx");

        {
            let mut writer = ArchiveWriter::create(&path)?;
            writer.add_file("a.txt", b"a")?;
            assert_eq!(staged_files(dir.path()).len(), 1);
        }

        assert!(!path.exists());
        assert!(staged_files(dir.path()).is_empty());
        Ok(())
    }

    #[test]
    fn test_rejects_duplicate_and_reserved_names() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut writer = ArchiveWriter::create(dir.path().join("data.dtx"))?;

        writer.add_file("a.txt", b"a")?;
        assert!(matches!(
            writer.add_file("a.txt", b"again"),
            Err(DtxError::DuplicateEntry(_))
        ));
        assert!(matches!(
            writer.add_file(MANIFEST_NAME, b""),
            Err(DtxError::ReservedName(_))
        ));
        assert!(matches!(writer.add_file("", b""), Err(DtxError::PathError(_))));

        Ok(())
    }

    #[test]
    fn test_rejects_line_breaks_in_names() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data.dtx");

        let mut writer = ArchiveWriter::create(&path)?;
        for name in ["a\nb.txt", "a.txt\r", "\r\n"] {
            assert!(
                matches!(writer.add_file(name, b"x"), Err(DtxError::PathError(_))),
                "{:?}",
                name
            );
        }

        // Rejected names are not reserved, so a clean name still goes in
        writer.add_file("a.txt", b"x")?;
        writer.finalize()?;

        let reader = ArchiveReader::open(&path)?;
        assert_eq!(reader.entry_names(), vec!["a.txt"]);
        Ok(())
    }

    #[test]
    fn test_normalizes_backslashes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data.dtx");

        let mut writer = ArchiveWriter::create(&path)?;
        writer.add_file("docs\\notes.txt", b"n")?;
        writer.finalize()?;

        let reader = ArchiveReader::open(&path)?;
        assert!(reader.contains("docs/notes.txt"));
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = ArchiveWriter::create(dir.path().join("no-such-dir").join("data.dtx"));
        assert!(matches!(result, Err(DtxError::Io(_))));
    }
}
