//! Package configuration resolution for Houdini Package Manager
//!
//! Turns a directory of Houdini package files into one resolved mapping of
//! environment variable name to ordered path values:
//!
//! - **Flattener**: nested documents become ordered `(path, value)` leaves
//! - **Variable Resolver**: `$NAME` tokens are replaced by the nearest
//!   preceding definition, then by the host's seed mapping
//! - **Alias Normalizer**: deprecated search-path keys fold into
//!   `HOUDINI_PATH`, and keys outside the `env` block are flagged
//! - **Package Aggregator**: per-file results fold into one mapping in a
//!   caller-controlled file order
//!
//! Faults never abort a run. They surface as [`Diagnostic`] values attached
//! to the file they came from.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use hpm_core::{PackageContext, PackageOptions, SeedMapping};
//!
//! let seed = SeedMapping::from([("HFS".to_string(), "/opt/hfs".to_string())]);
//! let options = PackageOptions::default();
//! let package = PackageContext::new(&seed, &options).resolve_str(
//!     Path::new("tools.json"),
//!     r#"{"env": [{"TOOLS": "$HFS/tools"}, {"hpath": "$TOOLS;&"}]}"#,
//! );
//!
//! assert_eq!(package.environment.get("HOUDINI_PATH").unwrap(), ["/opt/hfs/tools", "&"]);
//! assert_eq!(package.plugin_paths, vec!["/opt/hfs/tools"]);
//! ```

pub mod aggregate;
pub mod alias;
pub mod diagnostic;
pub mod document;
pub mod environment;
pub mod error;
pub mod flatten;
pub mod package;
pub mod path;
pub mod resolve;

pub use aggregate::{AggregateReport, FileOrdering, PackageAggregator};
pub use alias::{AliasDisposition, AliasNormalizer, AliasRule, AliasTable, HOUDINI_PATH};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use document::{ConfigDocument, Parsed};
pub use environment::EnvMap;
pub use error::{Error, Result};
pub use flatten::{FlatEntry, flatten, unflatten};
pub use package::{PackageContext, PackageOptions, PackageResolution};
pub use path::{NodePath, PathSegment, Scope};
pub use resolve::{ResolutionContext, ResolvedEntry, SeedMapping, VariableBinding};

/// Seed variable naming the directory packages are read from.
pub const HOUDINI_PACKAGE_PATH: &str = "HOUDINI_PACKAGE_PATH";
