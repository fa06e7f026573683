//! Configuration for the `dtx` binary
//!
//! Values come from an optional TOML file; command-line flags override them.
//!
//! ```toml
//! archive = "snippets/data.dtx"
//! bind = "127.0.0.1:5000"
//! log_level = "info"
//! ```

use crate::archive::DEFAULT_ARCHIVE_NAME;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_NAME: &str = "dtx.toml";

/// Port of the web viewer when none is configured
pub const DEFAULT_PORT: u16 = 5000;

/// Log level for diagnostic output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    #[default]
    Warn,

    /// Info, warnings, and errors
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Settings shared by the editor and the web viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtxConfig {
    /// Archive file to operate on
    pub archive: PathBuf,

    /// Address the web viewer listens on
    pub bind: SocketAddr,

    /// Minimum level of diagnostic output
    pub log_level: LogLevel,

    /// Write JSON logs to this file instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for DtxConfig {
    fn default() -> Self {
        Self {
            archive: PathBuf::from(DEFAULT_ARCHIVE_NAME),
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            log_level: LogLevel::default(),
            log_file: None,
        }
    }
}

impl DtxConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: DtxConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
