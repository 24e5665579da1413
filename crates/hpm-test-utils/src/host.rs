//! [`FakeHost`] for installation and environment snapshot scenarios.
//!
//! Each fake installation is a `Houdini X.Y.Z` directory whose
//! `bin/hconfig` is a small shell script. The scripts only run on Unix;
//! tests that execute them should be gated with `#[cfg(unix)]`.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PID_FILE: &str = "hconfig.pid";

/// What the fake `hconfig` does when run.
#[derive(Debug, Clone)]
pub enum Hconfig {
    /// Print `HFS` and `HOUDINI_USER_PREF_DIR`, then the given extra lines
    Reports(Vec<String>),
    /// Print exactly this text
    Raw(String),
    /// Record its PID in `bin/hconfig.pid`, then never exit on its own
    Hangs,
    /// Print to stderr and exit with the given status
    Fails(i32),
}

/// One fake installation.
#[derive(Debug, Clone)]
pub struct FakeInstall {
    pub version: String,
    pub hfs: PathBuf,
    pub pref_dir: PathBuf,
}

impl FakeInstall {
    /// `$HOUDINI_USER_PREF_DIR/packages`
    pub fn packages_dir(&self) -> PathBuf {
        self.pref_dir.join("packages")
    }

    /// PID of the last hanging `hconfig` started, once it has written it.
    pub fn hconfig_pid(&self) -> Option<u32> {
        let text = fs::read_to_string(self.hfs.join("bin").join(PID_FILE)).ok()?;
        text.trim().parse().ok()
    }

    /// Write `<name>.json` into the installation's package directory.
    pub fn add_package(&self, name: &str, json: &str) -> PathBuf {
        let path = self.packages_dir().join(format!("{name}.json"));
        fs::write(&path, json).unwrap();
        path
    }
}

/// A temporary directory holding fake Houdini installations.
///
/// # Example
///
/// ```rust,no_run
/// use hpm_test_utils::{FakeHost, Hconfig};
///
/// let host = FakeHost::new();
/// let install = host.install("19.5.569", Hconfig::Reports(vec![]));
/// install.add_package("labs", r#"{"env": [{"LABS": "$HFS/labs"}]}"#);
/// ```
pub struct FakeHost {
    temp_dir: TempDir,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Directory the installations live in, usable as an install root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create `Houdini <version>` with a scripted `hconfig` and an empty
    /// package directory.
    pub fn install(&self, version: &str, hconfig: Hconfig) -> FakeInstall {
        let hfs = self.root().join(format!("Houdini {version}"));
        let bin = hfs.join("bin");
        fs::create_dir_all(&bin).unwrap();

        let pref_dir = self.root().join("prefs").join(version);
        fs::create_dir_all(pref_dir.join("packages")).unwrap();

        let script = match hconfig {
            Hconfig::Reports(extra) => {
                let mut lines = vec![
                    format!("HFS := '{}'", hfs.display()),
                    format!("HOUDINI_USER_PREF_DIR := '{}'", pref_dir.display()),
                ];
                lines.extend(extra);
                print_script(&lines.join("\n"))
            }
            Hconfig::Raw(text) => print_script(&text),
            Hconfig::Hangs => format!(
                "#!/bin/sh\necho $$ > '{}'\nexec sleep 60\n",
                bin.join(PID_FILE).display()
            ),
            Hconfig::Fails(code) => format!("#!/bin/sh\necho 'hconfig: fatal error' >&2\nexit {code}\n"),
        };
        write_executable(&bin.join("hconfig"), &script);

        FakeInstall {
            version: version.to_string(),
            hfs,
            pref_dir,
        }
    }

    /// Create a directory next to the installations that is not one.
    pub fn add_unrelated_dir(&self, name: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }
}

fn print_script(output: &str) -> String {
    format!("#!/bin/sh\ncat <<'HCONFIG_EOF'\n{output}\nHCONFIG_EOF\n")
}

fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
