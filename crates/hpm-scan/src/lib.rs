//! Installation scanning for Houdini Package Manager
//!
//! Ties the host and the resolver together: for every installation, take an
//! environment snapshot, find the package directory, and fold its packages
//! into one environment mapping.
//!
//! - [`config`]: layered TOML configuration ([`ScanConfig`], [`ConfigLoader`])
//! - [`scanner`]: the bounded worker pool ([`Scanner`])
//! - [`report`]: per-installation results ([`InstallationReport`])
//!
//! # Example
//!
//! ```ignore
//! use hpm_scan::{ConfigLoader, Scanner};
//!
//! let config = ConfigLoader::new().load()?;
//! let report = Scanner::from_config(&config)
//!     .scan(config.installations())
//!     .await;
//! for install in &report.installations {
//!     println!("{}: {} variables", install.installation.name, install.environment.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod scanner;

pub use config::{ConfigLayer, ConfigLoader, FileOrder, InstallConfig, ScanConfig};
pub use error::{Error, Result};
pub use report::{InstallationReport, ScanReport, SeedStatus};
pub use scanner::{Scanner, packages_dir};
