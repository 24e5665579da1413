//! Tracing setup
//!
//! Logs go to stderr so `--json` output on stdout stays parseable.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, or debug
/// output for this tool's crates when `verbose` is on.
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,hpm=debug,hpm_core=debug,hpm_host=debug,hpm_scan=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose);

    // A subscriber may already be set in tests
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
