//! End-to-end scans over fake Houdini installations
//!
//! Every installation here has a real `hconfig` script, so these tests
//! exercise discovery, the subprocess snapshot, and the package fold together.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use hpm_core::{AliasDisposition, DiagnosticKind, HOUDINI_PACKAGE_PATH};
use hpm_scan::{ConfigLoader, Scanner, SeedStatus};
use hpm_test_utils::{FakeHost, FakeInstall, Hconfig};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Path to the test-fixtures directory (relative to the workspace root).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

/// Copy a fixture package directory into an installation's packages.
fn install_fixture_packages(install: &FakeInstall, fixture: &str) {
    let source = fixtures_dir().join("packages").join(fixture);
    for entry in fs::read_dir(&source).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, install.packages_dir().join(path.file_name().unwrap())).unwrap();
    }
}

/// A global config directory holding `config.toml` with `content`.
fn global_config(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), content).unwrap();
    dir
}

fn toml_path(path: &Path) -> String {
    format!("'{}'", path.display())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scan_isolates_hung_and_failing_installations() {
    let host = FakeHost::new();
    let good = host.install("20.0.547", Hconfig::Reports(vec![]));
    install_fixture_packages(&good, "studio");
    let hung = host.install("19.5.569", Hconfig::Hangs);
    hung.add_package("hung", r#"{"env": [{"HUNG": "$HFS/hung"}]}"#);
    host.install("18.5.672", Hconfig::Fails(2));

    let config_dir = global_config(&format!(
        "timeout_secs = 1\nworkers = 3\ninstall_roots = [{}]\n",
        toml_path(host.root())
    ));
    let config = ConfigLoader::new()
        .with_global_config_dir(config_dir.path())
        .load()
        .unwrap();

    let started = Instant::now();
    let report = Scanner::from_config(&config)
        .scan(config.installations())
        .await;
    assert!(started.elapsed() < Duration::from_secs(30));

    let statuses: Vec<_> = report
        .installations
        .iter()
        .map(|i| (i.installation.name.as_str(), i.seed_status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("Houdini 20.0.547", SeedStatus::Captured),
            ("Houdini 19.5.569", SeedStatus::TimedOut),
            ("Houdini 18.5.672", SeedStatus::Failed),
        ]
    );

    let captured = &report.installations[0];
    assert_eq!(
        captured.seed.get(HOUDINI_PACKAGE_PATH).map(String::as_str),
        Some(good.packages_dir().display().to_string().as_str())
    );
    let labs = format!("{}/SideFXLabs20.0", good.packages_dir().display());
    assert_eq!(
        captured.environment.get("HOUDINI_PATH").unwrap()[0],
        labs
    );
    assert_eq!(captured.packages.len(), 6);

    // No seed, so no user preference directory and no packages
    let timed_out = &report.installations[1];
    assert!(matches!(
        timed_out.diagnostics[0].kind,
        DiagnosticKind::EnvironmentSnapshotTimeout { timeout_ms: 1000 }
    ));
    assert_eq!(
        timed_out.diagnostics[1].kind,
        DiagnosticKind::PackageDirectoryUnknown
    );
    assert!(timed_out.environment.is_empty());

    let failed = &report.installations[2];
    assert!(matches!(
        &failed.diagnostics[0].kind,
        DiagnosticKind::SnapshotFailed { reason } if reason.contains("exit code 2")
    ));
    assert_eq!(report.degraded().count(), 2);
}

#[tokio::test]
async fn test_hung_installation_with_explicit_packages_dir_still_resolves() {
    let host = FakeHost::new();
    let hung = host.install("19.5.569", Hconfig::Hangs);
    hung.add_package("tools", r#"{"env": [{"TOOLS": "/studio/tools"}, {"hpath": "$TOOLS"}]}"#);

    let config_dir = global_config(&format!(
        "timeout_secs = 1\n\n[[installs]]\nname = \"hung\"\nhfs = {}\npackages_dir = {}\n",
        toml_path(&hung.hfs),
        toml_path(&hung.packages_dir()),
    ));
    let config = ConfigLoader::new()
        .with_global_config_dir(config_dir.path())
        .load()
        .unwrap();
    assert_eq!(config.installations().len(), 1);

    let report = Scanner::from_config(&config)
        .scan(config.installations())
        .await;
    let hung_report = &report.installations[0];

    assert_eq!(hung_report.installation.name, "hung");
    assert_eq!(hung_report.seed_status, SeedStatus::TimedOut);
    assert_eq!(
        hung_report.environment.get("HOUDINI_PATH").unwrap(),
        ["/studio/tools"]
    );
}

#[tokio::test]
async fn test_config_alias_rule_applies_to_scan() {
    let host = FakeHost::new();
    let install = host.install("20.0.547", Hconfig::Reports(vec![]));
    install.add_package(
        "legacy",
        r#"{"env": [{"HOUDINI_OTLSCAN_PATH": "/a"}, {"otlscan": "/b"}]}"#,
    );

    let config_dir = global_config(&format!(
        "install_roots = [{}]\n\n[[aliases]]\ndeprecated = \"otlscan\"\ncanonical = \"HOUDINI_OTLSCAN_PATH\"\ndisposition = \"reject-if-canonical-present\"\n",
        toml_path(host.root())
    ));
    let config = ConfigLoader::new()
        .with_global_config_dir(config_dir.path())
        .load()
        .unwrap();
    assert_eq!(
        config.aliases[0].disposition,
        AliasDisposition::RejectIfCanonicalPresent
    );

    let report = Scanner::from_config(&config)
        .scan(config.installations())
        .await;
    let scanned = &report.installations[0];

    assert_eq!(
        scanned.environment.get("HOUDINI_OTLSCAN_PATH").unwrap(),
        ["/a"]
    );
    assert!(scanned.all_diagnostics().any(|d| matches!(
        &d.kind,
        DiagnosticKind::DeprecatedKeyUsed { rejected, .. } if rejected == &vec!["/b".to_string()]
    )));
}

#[tokio::test]
async fn test_cancelled_scan_reports_every_installation() {
    let host = FakeHost::new();
    host.install("20.0.547", Hconfig::Hangs);
    host.install("19.5.569", Hconfig::Hangs);

    let config_dir = global_config(&format!(
        "timeout_secs = 60\ninstall_roots = [{}]\n",
        toml_path(host.root())
    ));
    let config = ConfigLoader::new()
        .with_global_config_dir(config_dir.path())
        .load()
        .unwrap();

    let cancel = CancellationToken::new();
    let scanner = Scanner::from_config(&config).with_cancellation(cancel.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let report = scanner.scan(config.installations()).await;
    canceller.await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(report.installations.len(), 2);
    assert!(report
        .installations
        .iter()
        .all(|i| i.seed_status == SeedStatus::Failed));
}

#[tokio::test]
async fn test_repeated_scans_serialize_identically() {
    let host = FakeHost::new();
    let install = host.install("20.0.547", Hconfig::Reports(vec![]));
    install_fixture_packages(&install, "studio");

    let config_dir = global_config(&format!("install_roots = [{}]\n", toml_path(host.root())));
    let config = ConfigLoader::new()
        .with_global_config_dir(config_dir.path())
        .load()
        .unwrap();
    let scanner = Scanner::from_config(&config);

    let first = serde_json::to_string(&scanner.scan(config.installations()).await).unwrap();
    let second = serde_json::to_string(&scanner.scan(config.installations()).await).unwrap();
    assert_eq!(first, second);
}
