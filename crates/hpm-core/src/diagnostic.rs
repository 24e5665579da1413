//! Structured diagnostics
//!
//! Faults inside the resolver are reported as data, never thrown. Each
//! diagnostic names the smallest unit that absorbed the fault: a reference,
//! a key, a file, or a whole installation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::path::NodePath;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// The file could not be reduced to sequence/mapping/scalar nodes
    MalformedDocument { reason: String },
    /// The file only parsed after lenient repairs
    RepairedDocument,
    /// A `$NAME` reference had no definition; the token was kept
    UndefinedVariable { name: String },
    /// A deprecated alias key was used alongside or instead of its canonical key
    DeprecatedKeyUsed {
        deprecated: String,
        canonical: String,
        /// Values excluded from the honoured mapping, if any
        #[serde(skip_serializing_if = "Vec::is_empty")]
        rejected: Vec<String>,
    },
    /// A key that is only honoured inside the `env` block appeared outside it
    MisplacedKey { key: String },
    /// The host's diagnostic utility did not answer in time
    EnvironmentSnapshotTimeout { timeout_ms: u64 },
    /// The host's diagnostic utility could not be run or failed
    SnapshotFailed { reason: String },
    /// No package directory could be determined for an installation
    PackageDirectoryUnknown,
    /// Resolution of an installation stopped on a bug rather than bad input
    InternalError { reason: String },
}

/// A diagnostic tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<NodePath>,
    pub message: String,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, severity: Severity, message: String) -> Self {
        Self {
            kind,
            severity,
            file: None,
            path: None,
            message,
        }
    }

    pub fn malformed_document(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let message = format!("package could not be parsed: {reason}");
        Self::new(
            DiagnosticKind::MalformedDocument { reason },
            Severity::Error,
            message,
        )
    }

    pub fn repaired_document() -> Self {
        Self::new(
            DiagnosticKind::RepairedDocument,
            Severity::Warning,
            "invalid JSON was repaired before parsing; fix the file to be sure it reads as intended"
                .to_string(),
        )
    }

    pub fn undefined_variable(name: impl Into<String>, at: NodePath) -> Self {
        let name = name.into();
        let message = format!("variable ${name} is not defined before use");
        Self::new(
            DiagnosticKind::UndefinedVariable { name },
            Severity::Warning,
            message,
        )
        .at(at)
    }

    pub fn deprecated_key_used(
        deprecated: impl Into<String>,
        canonical: impl Into<String>,
        rejected: Vec<String>,
    ) -> Self {
        let deprecated = deprecated.into();
        let canonical = canonical.into();
        let message = if rejected.is_empty() {
            format!("'{deprecated}' is deprecated; its values were merged into '{canonical}'")
        } else {
            format!(
                "'{deprecated}' is deprecated and '{canonical}' is present; ignored: {}",
                rejected.join(", ")
            )
        };
        Self::new(
            DiagnosticKind::DeprecatedKeyUsed {
                deprecated,
                canonical,
                rejected,
            },
            Severity::Info,
            message,
        )
    }

    pub fn misplaced_key(key: impl Into<String>, at: NodePath) -> Self {
        let key = key.into();
        let message = format!("'{key}' is only honoured inside the env block");
        Self::new(DiagnosticKind::MisplacedKey { key }, Severity::Warning, message).at(at)
    }

    pub fn snapshot_timeout(timeout: Duration) -> Self {
        Self::new(
            DiagnosticKind::EnvironmentSnapshotTimeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            Severity::Warning,
            format!(
                "host diagnostic utility did not respond within {:?}; using an empty seed",
                timeout
            ),
        )
    }

    pub fn snapshot_failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let message = format!("host environment unavailable ({reason}); using an empty seed");
        Self::new(
            DiagnosticKind::SnapshotFailed { reason },
            Severity::Warning,
            message,
        )
    }

    pub fn package_directory_unknown() -> Self {
        Self::new(
            DiagnosticKind::PackageDirectoryUnknown,
            Severity::Warning,
            "no package directory configured and HOUDINI_USER_PREF_DIR is not set".to_string(),
        )
    }

    pub fn internal_error(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let message = format!("internal error while resolving ({reason}); results are incomplete");
        Self::new(DiagnosticKind::InternalError { reason }, Severity::Error, message)
    }

    /// Attach the document path the diagnostic refers to.
    pub fn at(mut self, path: NodePath) -> Self {
        self.path = Some(path);
        self
    }

    /// Attach the originating file.
    pub fn in_file(mut self, file: &Path) -> Self {
        self.file = Some(file.to_path_buf());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.severity)?;
        if let Some(file) = &self.file {
            write!(f, "{}", file.display())?;
            if let Some(path) = &self.path {
                write!(f, " at {path}")?;
            }
            f.write_str(": ")?;
        } else if let Some(path) = &self.path {
            write!(f, "{path}: ")?;
        }
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;

    #[test]
    fn test_display_with_file_and_path() {
        let path = NodePath::from(vec![PathSegment::key("path")]);
        let diag = Diagnostic::misplaced_key("path", path).in_file(Path::new("labs.json"));
        assert_eq!(
            diag.to_string(),
            "warning: labs.json at path: 'path' is only honoured inside the env block"
        );
    }

    #[test]
    fn test_serializes_kind_inline() {
        let diag = Diagnostic::undefined_variable("NOVAR", NodePath::from(vec![PathSegment::key("x")]));
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "undefined-variable");
        assert_eq!(json["name"], "NOVAR");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["path"], "x");
        assert!(json.get("file").is_none());
    }

    #[test]
    fn test_timeout_records_millis() {
        let diag = Diagnostic::snapshot_timeout(Duration::from_secs(2));
        assert_eq!(
            diag.kind,
            DiagnosticKind::EnvironmentSnapshotTimeout { timeout_ms: 2000 }
        );
    }

    #[test]
    fn test_internal_error_is_distinct_from_snapshot_failure() {
        let diag = Diagnostic::internal_error("task 7 panicked");
        assert_eq!(diag.severity, Severity::Error);
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "internal-error");
        assert_eq!(json["reason"], "task 7 panicked");
    }

    #[test]
    fn test_rejected_values_change_message() {
        let merged = Diagnostic::deprecated_key_used("hpath", "HOUDINI_PATH", vec![]);
        assert!(merged.message.contains("merged"));

        let rejected =
            Diagnostic::deprecated_key_used("hpath", "HOUDINI_PATH", vec!["/x".to_string()]);
        assert!(rejected.message.contains("ignored: /x"));
    }
}
