//! Houdini installations and their discovery

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::version::HoudiniVersion;

/// Name of the host's environment diagnostic utility.
pub const HCONFIG: &str = "hconfig";

/// One installed copy of Houdini.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Installation {
    /// Display name, normally the install directory name
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<HoudiniVersion>,
    /// Install root, the `$HFS` of this installation
    pub hfs: PathBuf,
    /// Diagnostic utility used for the environment snapshot
    pub hconfig: PathBuf,
    /// Explicit package directory, overriding the one the host reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages_dir: Option<PathBuf>,
}

impl Installation {
    /// An installation rooted at `hfs`, named and versioned after the
    /// directory.
    pub fn new(hfs: impl Into<PathBuf>) -> Self {
        let hfs = hfs.into();
        let name = hfs
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| hfs.display().to_string());
        Self {
            version: HoudiniVersion::from_dir_name(&name),
            hconfig: default_hconfig(&hfs),
            name,
            hfs,
            packages_dir: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: HoudiniVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_hconfig(mut self, hconfig: impl Into<PathBuf>) -> Self {
        self.hconfig = hconfig.into();
        self
    }

    pub fn with_packages_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.packages_dir = Some(dir.into());
        self
    }
}

/// `<hfs>/bin/hconfig`, with the platform's executable suffix.
pub fn default_hconfig(hfs: &Path) -> PathBuf {
    hfs.join("bin")
        .join(format!("{HCONFIG}{}", std::env::consts::EXE_SUFFIX))
}

/// Find installations directly under each of `roots`, newest first.
///
/// Only directories named `Houdini <version>` or `hfs<version>` count.
/// Missing or unreadable roots are skipped.
pub fn discover_installations(roots: &[PathBuf]) -> Vec<Installation> {
    let mut found: Vec<Installation> = Vec::new();

    for root in roots {
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(root = %root.display(), error = %e, "Skipping install root");
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let installation = Installation::new(&path);
            if installation.version.is_none() {
                continue;
            }
            if found.iter().any(|i| i.hfs == installation.hfs) {
                continue;
            }
            debug!(hfs = %path.display(), "Found installation");
            found.push(installation);
        }
    }

    sort_newest_first(&mut found);
    found
}

/// Sort by version, newest first. Unversioned installations go last, by name.
pub fn sort_newest_first(installations: &mut [Installation]) {
    installations.sort_by(|a, b| {
        b.version
            .cmp(&a.version)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Platform install roots Houdini uses by default.
pub fn default_install_roots() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![PathBuf::from(r"C:\Program Files\Side Effects Software")]
    } else if cfg!(target_os = "macos") {
        vec![PathBuf::from("/Applications/Houdini")]
    } else {
        vec![PathBuf::from("/opt")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discovers_versioned_dirs_newest_first() {
        let root = TempDir::new().unwrap();
        for name in ["Houdini 19.5.569", "Houdini 20.0.547", "License Server", "Houdini 18.5.759"] {
            fs::create_dir(root.path().join(name)).unwrap();
        }
        fs::write(root.path().join("Houdini 21.0.100"), "not a dir").unwrap();

        let found = discover_installations(&[root.path().to_path_buf()]);
        let names: Vec<_> = found.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Houdini 20.0.547", "Houdini 19.5.569", "Houdini 18.5.759"]
        );
    }

    #[test]
    fn test_missing_root_is_skipped() {
        let found = discover_installations(&[PathBuf::from("/no/such/root")]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_same_root_twice_is_not_duplicated() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("Houdini 19.5.569")).unwrap();
        let roots = vec![root.path().to_path_buf(), root.path().to_path_buf()];
        assert_eq!(discover_installations(&roots).len(), 1);
    }

    #[test]
    fn test_default_hconfig_location() {
        let install = Installation::new("/opt/Houdini 19.5.569");
        assert_eq!(install.version, Some(HoudiniVersion::new(19, 5, 569)));
        assert!(install.hconfig.starts_with("/opt/Houdini 19.5.569/bin"));
        assert!(
            install
                .hconfig
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with(HCONFIG))
        );
    }

    #[test]
    fn test_unversioned_installations_sort_last() {
        let mut installs = vec![
            Installation::new("/custom/hfs"),
            Installation::new("/opt/Houdini 19.5.569"),
        ];
        sort_newest_first(&mut installs);
        assert_eq!(installs[0].name, "Houdini 19.5.569");
        assert_eq!(installs[1].name, "hfs");
    }
}
