//! Scanning installations in parallel
//!
//! Each installation is independent: it gets its own snapshot, its own
//! package directory and its own fold. The [`Scanner`] maps installations to
//! reports on a fixed number of workers. Inside one installation, packages
//! are folded sequentially.
//!
//! A snapshot that times out or fails degrades only its own installation,
//! which is then resolved against an empty seed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hpm_core::{Diagnostic, HOUDINI_PACKAGE_PATH, PackageAggregator, SeedMapping};
use hpm_host::{HconfigProvider, HostError, Installation, SnapshotProvider};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::ScanConfig;
use crate::report::{InstallationReport, ScanReport, SeedStatus};

/// Seed variable pointing at the user's preference directory.
pub const HOUDINI_USER_PREF_DIR: &str = "HOUDINI_USER_PREF_DIR";
/// Package directory name inside the preference directory.
pub const PACKAGES_DIR_NAME: &str = "packages";

const DEFAULT_WORKERS: usize = 4;

/// Maps installations to reports on a bounded worker pool.
#[derive(Clone)]
pub struct Scanner {
    provider: Arc<dyn SnapshotProvider>,
    aggregator: PackageAggregator,
    workers: usize,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("aggregator", &self.aggregator)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl Scanner {
    pub fn new(provider: Arc<dyn SnapshotProvider>, aggregator: PackageAggregator) -> Self {
        Self {
            provider,
            aggregator,
            workers: DEFAULT_WORKERS,
            cancel: CancellationToken::new(),
        }
    }

    /// A scanner running each installation's `hconfig`, set up from `config`.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            Arc::new(HconfigProvider::new(config.timeout())),
            config.aggregator(),
        )
        .with_workers(config.workers)
    }

    /// Number of installations processed at once, at least one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Cancelling `token` abandons outstanding snapshots. Affected
    /// installations are reported as failed, not dropped.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Scan every installation. Reports come back in input order.
    pub async fn scan(&self, installations: Vec<Installation>) -> ScanReport {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for (index, installation) in installations.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let scanner = self.clone();
            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = tokio::spawn(async move { scanner.scan_one(installation).await }).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<InstallationReport>> = vec![None; installations.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(report))) => slots[index] = Some(report),
                Ok((index, Err(e))) => {
                    let installation = installations[index].clone();
                    error!(install = %installation.name, error = %e, "Installation worker failed");
                    slots[index] = Some(worker_failed(installation, e.to_string()));
                }
                Err(e) => error!(error = %e, "Installation worker failed"),
            }
        }

        let installations = slots
            .into_iter()
            .zip(installations)
            .map(|(slot, installation)| {
                slot.unwrap_or_else(|| {
                    worker_failed(installation, "installation worker did not finish".to_string())
                })
            })
            .collect();

        ScanReport { installations }
    }

    /// Scan a single installation.
    pub async fn scan_one(&self, installation: Installation) -> InstallationReport {
        debug!(install = %installation.name, "Scanning installation");
        let mut report = InstallationReport::new(installation);

        match self
            .provider
            .snapshot(&report.installation, &self.cancel)
            .await
        {
            Ok(seed) => report.seed = seed,
            Err(HostError::Timeout { path, timeout }) => {
                warn!(install = %report.installation.name, ?timeout, "hconfig timed out");
                report.seed_status = SeedStatus::TimedOut;
                report
                    .diagnostics
                    .push(Diagnostic::snapshot_timeout(timeout).in_file(&path));
            }
            Err(e) => {
                warn!(install = %report.installation.name, error = %e, "Environment snapshot failed");
                report.seed_status = SeedStatus::Failed;
                report.diagnostics.push(
                    Diagnostic::snapshot_failed(e.to_string()).in_file(&report.installation.hconfig),
                );
            }
        }

        let Some(packages_dir) = packages_dir(&report.installation, &report.seed) else {
            warn!(install = %report.installation.name, "No package directory");
            report
                .diagnostics
                .push(Diagnostic::package_directory_unknown());
            return report;
        };

        report
            .seed
            .entry(HOUDINI_PACKAGE_PATH.to_string())
            .or_insert_with(|| packages_dir.display().to_string());
        report.packages_dir = Some(packages_dir.clone());

        if !packages_dir.is_dir() {
            debug!(dir = %packages_dir.display(), "Package directory does not exist");
            return report;
        }

        // Package files are read with blocking I/O
        let aggregator = self.aggregator.clone();
        let seed = report.seed.clone();
        let dir = packages_dir.clone();
        let folded = tokio::task::spawn_blocking(move || aggregator.aggregate_dir(&dir, &seed)).await;

        match folded {
            Ok(Ok(aggregate)) => {
                report.environment = aggregate.environment;
                report.misplaced = aggregate.misplaced;
                report.packages = aggregate.packages;
            }
            Ok(Err(e)) => {
                warn!(dir = %packages_dir.display(), error = %e, "Could not read package directory");
                report
                    .diagnostics
                    .push(Diagnostic::malformed_document(e.to_string()).in_file(&packages_dir));
            }
            Err(e) => {
                error!(dir = %packages_dir.display(), error = %e, "Package aggregation panicked");
                report
                    .diagnostics
                    .push(Diagnostic::internal_error(e.to_string()).in_file(&packages_dir));
            }
        }

        report
    }
}

/// Report for an installation whose worker died before producing one.
fn worker_failed(installation: Installation, reason: String) -> InstallationReport {
    let mut report = InstallationReport::new(installation);
    report.seed_status = SeedStatus::Failed;
    report.diagnostics.push(Diagnostic::internal_error(reason));
    report
}

/// The installation's explicit package directory, else
/// `$HOUDINI_USER_PREF_DIR/packages` from the seed.
pub fn packages_dir(installation: &Installation, seed: &SeedMapping) -> Option<PathBuf> {
    if let Some(dir) = &installation.packages_dir {
        return Some(dir.clone());
    }
    seed.get(HOUDINI_USER_PREF_DIR)
        .filter(|dir| !dir.trim().is_empty())
        .map(|dir| Path::new(dir).join(PACKAGES_DIR_NAME))
}
