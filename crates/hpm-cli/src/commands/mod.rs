//! Command implementations

mod installs;
mod resolve;
mod scan;
mod snapshot;

pub use installs::run_installs;
pub use resolve::run_resolve;
pub use scan::run_scan;
pub use snapshot::run_snapshot;
