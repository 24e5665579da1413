//! Error types for host operations

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while talking to a Houdini installation
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The diagnostic utility could not be started
    #[error("Failed to run {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The diagnostic utility did not exit in time and was killed
    #[error("{path} did not respond within {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },

    /// The caller gave up waiting
    #[error("Snapshot of {path} was cancelled")]
    Cancelled { path: PathBuf },

    /// The diagnostic utility exited with non-zero status
    #[error("Command failed (exit code {code}): {stderr}")]
    CommandFailed {
        /// Exit code, or -1 if killed by a signal
        code: i32,
        /// Captured stderr output
        stderr: String,
    },

    /// A directory name or string is not a `major.minor.build` version
    #[error("Not a Houdini version: '{0}'")]
    InvalidVersion(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for host operations
pub type Result<T> = std::result::Result<T, HostError>;
