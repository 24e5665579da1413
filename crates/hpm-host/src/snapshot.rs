//! Environment snapshots
//!
//! The seed mapping for an installation comes from its `hconfig` utility,
//! which prints the variables Houdini itself defines, one per line:
//!
//! ```text
//! HFS := '/opt/hfs19.5.569'
//! HOUDINI_USER_PREF_DIR := '/home/me/houdini19.5'
//! ```
//!
//! `hconfig` is known to hang on some malformed package files, so every run
//! is bounded by a timeout and can be cancelled. The child is killed when
//! either fires.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use hpm_core::SeedMapping;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{HostError, Result};
use crate::install::Installation;

/// Default bound on a single `hconfig` run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Supplies the seed mapping for an installation.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Take a snapshot, giving up early if `cancel` fires.
    async fn snapshot(
        &self,
        installation: &Installation,
        cancel: &CancellationToken,
    ) -> Result<SeedMapping>;
}

/// Runs the installation's `hconfig` and parses its output.
#[derive(Debug, Clone)]
pub struct HconfigProvider {
    timeout: Duration,
}

impl Default for HconfigProvider {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HconfigProvider {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl SnapshotProvider for HconfigProvider {
    async fn snapshot(
        &self,
        installation: &Installation,
        cancel: &CancellationToken,
    ) -> Result<SeedMapping> {
        let path = installation.hconfig.as_path();
        debug!(hconfig = %path.display(), timeout = ?self.timeout, "Running hconfig");

        let mut cmd = Command::new(path);
        if let Some(dir) = path.parent().filter(|d| d.is_dir()) {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| HostError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;

        // Dropping the wait future drops the child, which kills it.
        let output = tokio::select! {
            result = tokio::time::timeout(self.timeout, child.wait_with_output()) => match result {
                Ok(output) => output?,
                Err(_) => {
                    return Err(HostError::Timeout {
                        path: path.to_path_buf(),
                        timeout: self.timeout,
                    });
                }
            },
            _ = cancel.cancelled() => {
                return Err(HostError::Cancelled { path: path.to_path_buf() });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(HostError::CommandFailed { code, stderr });
        }

        let seed = parse_snapshot(&String::from_utf8_lossy(&output.stdout));
        debug!(hconfig = %path.display(), vars = seed.len(), "hconfig finished");
        Ok(seed)
    }
}

/// Returns the same seed for every installation.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    seed: SeedMapping,
}

impl StaticProvider {
    pub fn new(seed: SeedMapping) -> Self {
        Self { seed }
    }
}

#[async_trait]
impl SnapshotProvider for StaticProvider {
    async fn snapshot(
        &self,
        _installation: &Installation,
        _cancel: &CancellationToken,
    ) -> Result<SeedMapping> {
        Ok(self.seed.clone())
    }
}

/// Parse `hconfig`-style output into a seed mapping.
///
/// The name runs up to the first whitespace; the rest of the line is the
/// value. A leading `:=` and one pair of matching quotes are stripped.
/// Lines with no value are skipped and later names override earlier ones.
pub fn parse_snapshot(text: &str) -> SeedMapping {
    let mut seed = SeedMapping::new();
    for line in text.lines() {
        if let Some((name, value)) = parse_line(line) {
            seed.insert(name.to_string(), value.to_string());
        }
    }
    seed
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let (name, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    let rest = match rest.strip_prefix(":=") {
        Some(after) => after.trim_start(),
        None => rest,
    };
    if rest.is_empty() {
        return None;
    }
    Some((name, strip_quotes(rest)))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Read a saved snapshot, e.g. the redirected output of `hconfig`.
pub fn load_snapshot_file(path: &Path) -> Result<SeedMapping> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_snapshot(&text))
}
