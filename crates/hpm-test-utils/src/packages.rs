//! [`TestPackages`] builder for package directory scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary package directory.
///
/// # Example
///
/// ```rust
/// use hpm_test_utils::TestPackages;
///
/// let packages = TestPackages::new()
///     .with_package("labs", r#"{"env": [{"LABS": "/labs"}]}"#)
///     .with_package("redshift", r#"{"enable": false}"#);
/// assert!(packages.file("labs").exists());
/// ```
pub struct TestPackages {
    temp_dir: TempDir,
}

impl Default for TestPackages {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPackages {
    /// Create an empty package directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the package directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `<name>.json` with the given contents.
    pub fn with_package(self, name: &str, json: &str) -> Self {
        self.write(&format!("{name}.json"), json);
        self
    }

    /// Write an arbitrary file, e.g. a non-package `README.txt`.
    pub fn write(&self, file_name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(file_name);
        fs::write(&path, contents)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
        path
    }

    /// Path of `<name>.json`.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(format!("{name}.json"))
    }

    /// Paths of the named packages, in the given order.
    pub fn files(&self, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|name| self.file(name)).collect()
    }
}
