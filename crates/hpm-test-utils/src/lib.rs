//! Shared test utilities for the houdini-package-manager workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`packages`]: [`TestPackages`] builder for package directories
//! - [`host`]: [`FakeHost`] for fake Houdini installations with a scripted
//!   `hconfig`

pub mod host;
pub mod packages;

pub use host::{FakeHost, FakeInstall, Hconfig};
pub use packages::TestPackages;
