//! Scan results

use std::path::PathBuf;

use hpm_core::{Diagnostic, EnvMap, PackageResolution, SeedMapping};
use hpm_host::Installation;
use serde::Serialize;

/// How the seed mapping of an installation was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedStatus {
    /// The provider answered
    Captured,
    /// The provider did not answer in time; the seed is empty
    TimedOut,
    /// The provider failed or was cancelled; the seed is empty
    Failed,
}

impl SeedStatus {
    pub fn is_degraded(self) -> bool {
        self != Self::Captured
    }
}

/// Result for one installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationReport {
    pub installation: Installation,
    pub seed_status: SeedStatus,
    pub seed: SeedMapping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages_dir: Option<PathBuf>,
    pub environment: EnvMap,
    pub misplaced: EnvMap,
    pub packages: Vec<PackageResolution>,
    /// Faults that concern the installation rather than one package
    pub diagnostics: Vec<Diagnostic>,
}

impl InstallationReport {
    pub(crate) fn new(installation: Installation) -> Self {
        Self {
            installation,
            seed_status: SeedStatus::Captured,
            seed: SeedMapping::new(),
            packages_dir: None,
            environment: EnvMap::new(),
            misplaced: EnvMap::new(),
            packages: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Installation diagnostics followed by every package's, in fold order.
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .chain(self.packages.iter().flat_map(|p| p.diagnostics.iter()))
    }
}

/// Result of a whole scan, one report per installation in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub installations: Vec<InstallationReport>,
}

impl ScanReport {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.installations.iter().flat_map(|i| i.all_diagnostics())
    }

    pub fn degraded(&self) -> impl Iterator<Item = &InstallationReport> {
        self.installations
            .iter()
            .filter(|i| i.seed_status.is_degraded())
    }
}
