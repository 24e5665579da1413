//! Snapshot command

use std::path::Path;
use std::time::Duration;

use hpm_host::{HconfigProvider, Installation, SnapshotProvider};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::render;

/// Run one installation's `hconfig` and print what it reports.
pub fn run_snapshot(hfs: &Path, hconfig: Option<&Path>, timeout: u64, json: bool) -> Result<()> {
    let mut installation = Installation::new(hfs);
    if let Some(path) = hconfig {
        installation = installation.with_hconfig(path);
    }
    let provider = HconfigProvider::new(Duration::from_secs(timeout));

    let runtime = tokio::runtime::Runtime::new()?;
    let seed = runtime.block_on(provider.snapshot(&installation, &CancellationToken::new()))?;

    if json {
        return render::print_json(&seed);
    }
    render::print_seed(&seed);
    Ok(())
}
