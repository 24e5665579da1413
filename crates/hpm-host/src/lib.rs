//! Houdini installations and environment snapshots for Houdini Package Manager
//!
//! This crate knows about the host application:
//!
//! - Parsing Houdini versions and discovering installations on disk
//! - Running each installation's `hconfig` to obtain the seed mapping,
//!   bounded by a timeout and a cancellation token
//!
//! Snapshot failures are returned as [`HostError`]s. Callers that scan many
//! installations decide how to degrade; see `hpm-scan`.

pub mod error;
pub mod install;
pub mod snapshot;
pub mod version;

pub use error::{HostError, Result};
pub use install::{Installation, default_install_roots, discover_installations};
pub use snapshot::{
    HconfigProvider, SnapshotProvider, StaticProvider, load_snapshot_file, parse_snapshot,
};
pub use version::HoudiniVersion;
