//! Error types for hpm-core
//!
//! These errors describe a single document or file. The package pipeline
//! converts them into [`Diagnostic`](crate::Diagnostic)s so that one broken
//! package never stops its siblings from resolving.

use std::path::PathBuf;

/// Result type for hpm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hpm-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The text could not be parsed as a document, even after repairs
    #[error("Failed to parse {format} content: {message}")]
    ParseError { format: String, message: String },

    /// A node in the parsed tree is not a sequence, mapping, or scalar
    #[error("Unsupported {kind} value at {path}")]
    UnsupportedNode { path: String, kind: &'static str },

    /// Flattened entries cannot be re-nested into a single tree
    #[error("Inconsistent entry paths at {path}: {reason}")]
    InconsistentPaths { path: String, reason: String },

    /// A package file or directory could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            format: format.into(),
            message: message.into(),
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}
