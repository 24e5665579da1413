//! Houdini version numbers.
//!
//! Houdini versions are `major.minor.build`, e.g. `19.5.569`. They map
//! directly onto semver, which gives them a total order for sorting
//! installations newest first. Install directories are named
//! `Houdini <version>` on Windows and macOS, `hfs<version>` on Linux.
//!
//! ```
//! use hpm_host::HoudiniVersion;
//!
//! let version = HoudiniVersion::from_dir_name("Houdini 19.5.569").unwrap();
//! assert_eq!(version.front(), "19.5");
//! assert!(version < "20.0.547".parse::<HoudiniVersion>().unwrap());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{HostError, Result};

/// Prefix of Windows and macOS install directory names.
pub const INSTALL_DIR_PREFIX: &str = "Houdini";
/// Prefix of Linux install directory names.
pub const LINUX_INSTALL_DIR_PREFIX: &str = "hfs";

/// A parsed `major.minor.build` version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HoudiniVersion(semver::Version);

impl HoudiniVersion {
    pub fn new(major: u64, minor: u64, build: u64) -> Self {
        Self(semver::Version::new(major, minor, build))
    }

    /// Parse an install directory name such as `Houdini 19.5.569` or
    /// `hfs19.5.569`.
    ///
    /// Returns `None` for anything else (license servers, launchers).
    pub fn from_dir_name(name: &str) -> Option<Self> {
        if let Some(rest) = name.strip_prefix(INSTALL_DIR_PREFIX) {
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            return rest.trim().parse().ok();
        }
        let rest = name.strip_prefix(LINUX_INSTALL_DIR_PREFIX)?;
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        rest.parse().ok()
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn build(&self) -> u64 {
        self.0.patch
    }

    /// The `major.minor` part, as used in preference directory names.
    pub fn front(&self) -> String {
        format!("{}.{}", self.0.major, self.0.minor)
    }
}

impl FromStr for HoudiniVersion {
    type Err = HostError;

    /// Accepts `19.5.569`, and `19.5` as `19.5.0`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(version) = semver::Version::parse(s) {
            return Ok(Self(version));
        }
        semver::Version::parse(&format!("{s}.0"))
            .map(Self)
            .map_err(|_| HostError::InvalidVersion(s.to_string()))
    }
}

impl fmt::Display for HoudiniVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for HoudiniVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Houdini 19.5.569", Some(HoudiniVersion::new(19, 5, 569)))]
    #[case("Houdini 20.0.547", Some(HoudiniVersion::new(20, 0, 547)))]
    #[case("Houdini 20.5", Some(HoudiniVersion::new(20, 5, 0)))]
    #[case("Houdini Server", None)]
    #[case("Houdini19.5.569", None)]
    #[case("License Server", None)]
    #[case("houdini 19.5.569", None)]
    #[case("hfs19.5.569", Some(HoudiniVersion::new(19, 5, 569)))]
    #[case("hfs", None)]
    #[case("hfs.19.5", None)]
    fn test_from_dir_name(#[case] name: &str, #[case] expected: Option<HoudiniVersion>) {
        assert_eq!(HoudiniVersion::from_dir_name(name), expected);
    }

    #[test]
    fn test_ordering_is_numeric() {
        let mut versions: Vec<HoudiniVersion> = ["19.5.569", "20.0.547", "19.5.1000", "18.5.759"]
            .iter()
            .map(|v| v.parse().unwrap())
            .collect();
        versions.sort();
        let rendered: Vec<_> = versions.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["18.5.759", "19.5.569", "19.5.1000", "20.0.547"]);
    }

    #[test]
    fn test_invalid_version() {
        let err = "nineteen".parse::<HoudiniVersion>().unwrap_err();
        assert!(matches!(err, HostError::InvalidVersion(v) if v == "nineteen"));
    }

    #[test]
    fn test_front() {
        assert_eq!(HoudiniVersion::new(19, 5, 569).front(), "19.5");
    }
}
