use std::io;
use thiserror::Error;
use zip::result::ZipError;

/// Result type for datatext operations
pub type Result<T> = std::result::Result<T, DtxError>;

/// Unified error type for all datatext operations
#[derive(Debug, Error)]
pub enum DtxError {
    // Archive errors
    #[error("Archive not found: {0}")]
    ArchiveNotFound(String),

    #[error("Archive already exists: {0}")]
    ArchiveExists(String),

    #[error("Invalid archive format: {0}")]
    InvalidFormat(String),

    #[error("File not found in archive: {0}")]
    FileNotFound(String),

    #[error("Duplicate entry in archive: {0}")]
    DuplicateEntry(String),

    #[error("Entry name is reserved: {0}")]
    ReservedName(String),

    #[error("Entry is not valid UTF-8 text: {0}")]
    NotUtf8(String),

    // Manifest errors
    #[error("Manifest not found in archive")]
    ManifestNotFound,

    #[error("Invalid manifest at line {line}: {reason}")]
    InvalidManifest { line: usize, reason: String },

    #[error("No file with id {0}")]
    UnknownId(u32),

    // Filesystem errors
    #[error("Permission denied: {0}. The file may be in use; close other applications accessing it")]
    PermissionDenied(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Configuration errors
    #[error("TOML error: {0}")]
    TomlError(String),

    #[error("{0}")]
    Other(String),
}

impl From<ZipError> for DtxError {
    fn from(err: ZipError) -> Self {
        match err {
            ZipError::Io(e) => DtxError::Io(e),
            ZipError::FileNotFound => DtxError::FileNotFound(String::new()),
            other => DtxError::InvalidFormat(other.to_string()),
        }
    }
}

impl From<toml::de::Error> for DtxError {
    fn from(err: toml::de::Error) -> Self {
        DtxError::TomlError(err.to_string())
    }
}

impl From<toml::ser::Error> for DtxError {
    fn from(err: toml::ser::Error) -> Self {
        DtxError::TomlError(err.to_string())
    }
}
