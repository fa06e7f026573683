//! datatext: a zip archive of files indexed by a sequential id manifest
//!
//! The archive (`data.dtx` by default) is a standard zip file. Next to the
//! stored files it carries one reserved text entry, `.ids`, listing every
//! file as `<id>: <name>` with ids numbered `1..=N` in archive order.
//!
//! - [`DtxArchive`] creates archives and adds, removes, saves and lists files,
//!   renumbering the manifest after every change.
//! - [`editor::Editor`] is the interactive numbered menu over those operations.
//! - [`viewer`] serves the manifest and file contents over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use datatext::DtxArchive;
//!
//! let archive = DtxArchive::open_or_create("data.dtx")?;
//! let added = archive.add_bytes("notes.txt", b"hello")?;
//! assert_eq!(added.id, 1);
//!
//! for file in archive.list()? {
//!     println!("{}", file); // notes.txt (5 bytes)
//! }
//!
//! archive.save(1, "out.txt".as_ref())?;
//! # Ok::<(), datatext::DtxError>(())
//! ```

// Core modules
pub mod archive;
pub mod config;
pub mod editor;
pub mod error;
pub mod lock;
pub mod logging;
pub mod maintainer;
pub mod manifest;
pub mod store;
pub mod viewer;

// Re-export commonly used types
pub use archive::{
    ArchiveReader, ArchiveWriter, Entry, EntryInfo, DEFAULT_ARCHIVE_NAME, MANIFEST_NAME,
};
pub use config::{DtxConfig, LogLevel};
pub use error::{DtxError, Result};
pub use lock::ArchiveLock;
pub use manifest::{Manifest, ManifestEntry};
pub use store::DtxArchive;
