//! Scan configuration with layered loading
//!
//! Configuration is read from up to two TOML files, later layers overriding
//! earlier ones:
//!
//! 1. Global defaults (`<config_dir>/houdini-package-manager/config.toml`)
//! 2. An explicit file, e.g. from `hpm scan --config`
//!
//! Scalar settings from a later layer replace earlier ones. Lists
//! (`install_roots`, `installs`, `aliases`) are extended with unique values.
//!
//! ```toml
//! timeout_secs = 5
//! workers = 2
//! file_order = "listing"
//! install_roots = ["C:/Program Files/Side Effects Software"]
//!
//! [[installs]]
//! hfs = "/opt/hfs20.0.547"
//! packages_dir = "/studio/houdini/packages"
//!
//! [[aliases]]
//! deprecated = "hpath"
//! canonical = "HOUDINI_PATH"
//! disposition = "warn"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hpm_core::{AliasRule, AliasTable, FileOrdering, PackageAggregator, PackageOptions};
use hpm_host::{Installation, install};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "houdini-package-manager";
/// File name of a config layer.
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_WORKERS: usize = 4;

/// Built-in file orderings that can be named in a config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileOrder {
    #[default]
    Lexicographic,
    Listing,
}

impl From<FileOrder> for FileOrdering {
    fn from(order: FileOrder) -> Self {
        match order {
            FileOrder::Lexicographic => FileOrdering::Lexicographic,
            FileOrder::Listing => FileOrdering::Listing,
        }
    }
}

/// An installation listed explicitly in the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub hfs: PathBuf,
    #[serde(default)]
    pub packages_dir: Option<PathBuf>,
    #[serde(default)]
    pub hconfig: Option<PathBuf>,
}

impl InstallConfig {
    pub fn to_installation(&self) -> Installation {
        let mut installation = Installation::new(&self.hfs);
        if let Some(name) = &self.name {
            installation = installation.with_name(name);
        }
        if let Some(dir) = &self.packages_dir {
            installation = installation.with_packages_dir(dir);
        }
        if let Some(hconfig) = &self.hconfig {
            installation = installation.with_hconfig(hconfig);
        }
        installation
    }
}

/// One config file as written. Everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub timeout_secs: Option<u64>,
    pub workers: Option<usize>,
    pub file_order: Option<FileOrder>,
    pub normalize_separators: Option<bool>,
    pub include_disabled: Option<bool>,
    pub carry_bindings: Option<bool>,
    #[serde(default)]
    pub install_roots: Vec<PathBuf>,
    #[serde(default)]
    pub installs: Vec<InstallConfig>,
    #[serde(default)]
    pub aliases: Vec<AliasRule>,
}

impl ConfigLayer {
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path)
    }
}

/// The effective scan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanConfig {
    /// Bound on each `hconfig` run
    pub timeout_secs: u64,
    /// Installations scanned at once
    pub workers: usize,
    pub file_order: FileOrder,
    pub normalize_separators: bool,
    pub include_disabled: bool,
    pub carry_bindings: bool,
    /// Directories searched for `Houdini <version>` installs
    pub install_roots: Vec<PathBuf>,
    pub installs: Vec<InstallConfig>,
    /// Rules added to the built-in alias table
    pub aliases: Vec<AliasRule>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            workers: DEFAULT_WORKERS,
            file_order: FileOrder::default(),
            normalize_separators: true,
            include_disabled: false,
            carry_bindings: true,
            install_roots: Vec::new(),
            installs: Vec::new(),
            aliases: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Overlay `layer` onto this config.
    pub fn merge(&mut self, layer: &ConfigLayer) {
        if let Some(timeout) = layer.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(workers) = layer.workers {
            self.workers = workers.max(1);
        }
        if let Some(order) = layer.file_order {
            self.file_order = order;
        }
        if let Some(normalize) = layer.normalize_separators {
            self.normalize_separators = normalize;
        }
        if let Some(include) = layer.include_disabled {
            self.include_disabled = include;
        }
        if let Some(carry) = layer.carry_bindings {
            self.carry_bindings = carry;
        }

        for root in &layer.install_roots {
            if !self.install_roots.contains(root) {
                self.install_roots.push(root.clone());
            }
        }
        for install in &layer.installs {
            if !self.installs.iter().any(|i| i.hfs == install.hfs) {
                self.installs.push(install.clone());
            }
        }
        for rule in &layer.aliases {
            if !self.aliases.contains(rule) {
                self.aliases.push(rule.clone());
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The built-in alias rules with any configured ones on top.
    pub fn alias_table(&self) -> AliasTable {
        self.aliases
            .iter()
            .cloned()
            .fold(AliasTable::houdini(), AliasTable::with_rule)
    }

    pub fn package_options(&self) -> PackageOptions {
        PackageOptions {
            normalize_separators: self.normalize_separators,
            aliases: self.alias_table(),
        }
    }

    pub fn aggregator(&self) -> PackageAggregator {
        PackageAggregator::new(self.package_options())
            .with_ordering(self.file_order.into())
            .include_disabled(self.include_disabled)
            .carry_bindings(self.carry_bindings)
    }

    /// Installations to scan: explicit ones in config order, then those
    /// discovered under the install roots, newest first.
    ///
    /// With neither configured, the platform's default roots are searched.
    pub fn installations(&self) -> Vec<Installation> {
        let mut out: Vec<Installation> =
            self.installs.iter().map(InstallConfig::to_installation).collect();

        let roots = if self.install_roots.is_empty() && self.installs.is_empty() {
            install::default_install_roots()
        } else {
            self.install_roots.clone()
        };
        for found in install::discover_installations(&roots) {
            if !out.iter().any(|i| i.hfs == found.hfs) {
                out.push(found);
            }
        }
        out
    }
}

/// Loads a [`ScanConfig`] from its layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Override for the global config directory (used for testing).
    /// When `None`, `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,
    explicit: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom global config directory instead of the platform one.
    pub fn with_global_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_config_dir_override = Some(dir.into());
        self
    }

    /// Add an explicit config file as the last layer. It must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.global_config_dir_override {
            return Some(dir.clone());
        }
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
    }

    /// Merge all layers over the defaults.
    pub fn load(&self) -> Result<ScanConfig> {
        let mut config = ScanConfig::default();

        // Layer 1 - global defaults
        if let Some(global_dir) = self.global_config_dir() {
            let global_config_path = global_dir.join(CONFIG_FILE_NAME);
            if global_config_path.is_file() {
                tracing::debug!(?global_config_path, "Loading global config (layer 1)");
                config.merge(&ConfigLayer::load(&global_config_path)?);
            } else {
                tracing::debug!(?global_config_path, "No global config found (layer 1), skipping");
            }
        }

        // Layer 2 - explicit file
        if let Some(path) = &self.explicit {
            if !path.is_file() {
                return Err(Error::ConfigNotFound { path: path.clone() });
            }
            tracing::debug!(?path, "Loading config (layer 2)");
            config.merge(&ConfigLayer::load(path)?);
        }

        Ok(config)
    }
}
