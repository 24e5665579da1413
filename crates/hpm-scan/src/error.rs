//! Error types for hpm-scan

use std::path::PathBuf;

/// Result type for hpm-scan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring a scan
///
/// Faults inside a scan never show up here; they are recorded on the
/// affected installation's report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicitly requested config file does not exist
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// A config file is not valid TOML or has the wrong shape
    #[error("Invalid configuration in {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Core(#[from] hpm_core::Error),

    #[error(transparent)]
    Host(#[from] hpm_host::HostError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
