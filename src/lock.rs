//! Advisory single-writer lock for an archive
//!
//! The lock lives in a sidecar file next to the archive (`data.dtx.lock`).
//! The archive itself is replaced by rename on every mutation, so it cannot
//! carry the lock.
//!
//! Readers never need write access: when the lock file cannot be created
//! (read-only media, no write permission on the directory) a shared lock
//! uses an existing lock file opened read-only, or reads without a lock.

use crate::error::{DtxError, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Held advisory lock; released on drop
#[derive(Debug)]
pub struct ArchiveLock {
    file: Option<File>,
    path: PathBuf,
}

impl ArchiveLock {
    /// Block until no other reader or writer holds the archive
    pub fn exclusive(archive: &Path) -> Result<Self> {
        let path = lock_path(archive);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| lock_error(&path, e))?;
        FileExt::lock_exclusive(&file).map_err(|e| lock_error(&path, e))?;
        tracing::trace!(lock = %path.display(), "Acquired exclusive lock");
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    /// Block until no writer holds the archive
    ///
    /// Fails with `ArchiveNotFound` before touching the lock file when the
    /// archive does not exist.
    pub fn shared(archive: &Path) -> Result<Self> {
        if !archive.is_file() {
            return Err(DtxError::ArchiveNotFound(archive.display().to_string()));
        }

        let path = lock_path(archive);
        let file = match OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if is_read_only(&e) => match File::open(&path) {
                Ok(file) => file,
                Err(_) => {
                    tracing::debug!(
                        lock = %path.display(),
                        "Lock file not writable, reading without a lock: {}",
                        e
                    );
                    return Ok(Self { file: None, path });
                }
            },
            Err(e) => return Err(lock_error(&path, e)),
        };

        FileExt::lock_shared(&file).map_err(|e| lock_error(&path, e))?;
        tracing::trace!(lock = %path.display(), "Acquired shared lock");
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an advisory lock is actually held
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for ArchiveLock {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            if let Err(e) = FileExt::unlock(file) {
                tracing::warn!(lock = %self.path.display(), "Failed to release lock: {}", e);
            }
        }
    }
}

/// Sidecar lock path for an archive
pub fn lock_path(archive: &Path) -> PathBuf {
    let mut name = archive.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

fn is_read_only(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem
    )
}

fn lock_error(path: &Path, err: io::Error) -> DtxError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => DtxError::PermissionDenied(path.display().to_string()),
        _ => DtxError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_path() {
        assert_eq!(
            lock_path(Path::new("dir/data.dtx")),
            PathBuf::from("dir/data.dtx.lock")
        );
    }

    #[test]
    fn test_exclusive_lock_excludes_others() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.dtx");

        let held = ArchiveLock::exclusive(&archive).unwrap();
        assert!(held.path().exists());

        let other = OpenOptions::new().write(true).open(held.path()).unwrap();
        assert!(FileExt::try_lock_shared(&other).is_err());

        drop(held);
        assert!(FileExt::try_lock_exclusive(&other).is_ok());
    }

    #[test]
    fn test_shared_locks_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.dtx");

        std::fs::write(&archive, b"").unwrap();

        let first = ArchiveLock::shared(&archive).unwrap();
        let second = ArchiveLock::shared(&archive).unwrap();
        assert_eq!(first.path(), second.path());
        assert!(first.is_held() && second.is_held());
    }

    #[test]
    fn test_shared_lock_on_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.dtx");

        let result = ArchiveLock::shared(&archive);
        assert!(matches!(result, Err(DtxError::ArchiveNotFound(_))));
        assert!(!lock_path(&archive).exists());

        let nested = dir.path().join("no-such-dir").join("data.dtx");
        assert!(matches!(
            ArchiveLock::shared(&nested),
            Err(DtxError::ArchiveNotFound(_))
        ));
    }

    #[test]
    fn test_read_only_errors_fall_back() {
        assert!(is_read_only(&io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(is_read_only(&io::Error::from(io::ErrorKind::ReadOnlyFilesystem)));
        assert!(!is_read_only(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[cfg(unix)]
    #[test]
    fn test_shared_lock_in_read_only_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let ro = dir.path().join("ro");
        std::fs::create_dir(&ro).unwrap();
        let archive = ro.join("data.dtx");
        std::fs::write(&archive, b"").unwrap();
        std::fs::set_permissions(&ro, std::fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users can still write; nothing to check then
        let writable = std::fs::write(ro.join("check"), b"").is_ok();
        if !writable {
            let lock = ArchiveLock::shared(&archive).unwrap();
            assert!(!lock.is_held());
            assert!(!lock_path(&archive).exists());
        }

        std::fs::set_permissions(&ro, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
