//! Tests over the package directories in test-fixtures/

use std::path::PathBuf;

use hpm_core::{DiagnosticKind, HOUDINI_PACKAGE_PATH, PackageAggregator, SeedMapping, Severity};
use pretty_assertions::assert_eq;

/// Path to the test-fixtures directory (relative to the workspace root).
fn fixtures_dir() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // crates/hpm-core -> ../../test-fixtures
    manifest_dir.join("../../test-fixtures")
}

fn studio_seed() -> SeedMapping {
    SeedMapping::from([
        ("HFS".to_string(), "/opt/hfs20.0.547".to_string()),
        (HOUDINI_PACKAGE_PATH.to_string(), "/prefs/packages".to_string()),
    ])
}

#[test]
fn test_studio_packages_environment() {
    let report = PackageAggregator::default()
        .aggregate_dir(&fixtures_dir().join("packages/studio"), &studio_seed())
        .unwrap();

    let names: Vec<_> = report.packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["SideFXLabs", "broken", "disabled", "legacy_tools", "qLib", "windows_paths"]
    );

    assert_eq!(
        report.environment.get("HOUDINI_PATH").unwrap(),
        [
            "/prefs/packages/SideFXLabs20.0",
            "/opt/hfs20.0.547/legacy_tools",
            "&",
            "/studio/qLib",
            "/studio/qLib/otls",
            "D:/studio/houdini/tools",
        ]
    );
    assert_eq!(
        report.environment.get("PATH").unwrap(),
        ["/prefs/packages/SideFXLabs20.0/bin"]
    );
    assert_eq!(
        report.environment.get("UNSET").unwrap(),
        ["$NOT_DEFINED_ANYWHERE/x"]
    );
    assert!(!report.environment.contains_key("BROKEN"));
    assert!(!report.environment.contains_key("method"));
    assert!(!report.environment.contains_key("load_package_once"));

    assert_eq!(
        report.misplaced.get("hpath").unwrap(),
        ["/opt/hfs20.0.547/legacy_tools"]
    );
}

#[test]
fn test_studio_packages_diagnostics() {
    let report = PackageAggregator::default()
        .aggregate_dir(&fixtures_dir().join("packages/studio"), &studio_seed())
        .unwrap();

    let kinds: Vec<(&str, &DiagnosticKind)> = report
        .packages
        .iter()
        .flat_map(|p| p.diagnostics.iter().map(move |d| (p.name.as_str(), &d.kind)))
        .collect();

    assert_eq!(kinds.len(), 5, "{kinds:#?}");
    assert!(matches!(kinds[0], ("broken", DiagnosticKind::MalformedDocument { .. })));
    assert_eq!(
        kinds[1],
        ("legacy_tools", &DiagnosticKind::MisplacedKey { key: "hpath".to_string() })
    );
    assert_eq!(
        kinds[2],
        (
            "qLib",
            &DiagnosticKind::UndefinedVariable {
                name: "NOT_DEFINED_ANYWHERE".to_string()
            }
        )
    );
    assert!(matches!(
        kinds[3],
        ("qLib", DiagnosticKind::DeprecatedKeyUsed { .. })
    ));
    assert_eq!(kinds[4], ("windows_paths", &DiagnosticKind::RepairedDocument));

    let errors = report
        .diagnostics()
        .filter(|d| d.severity == Severity::Error)
        .count();
    assert_eq!(errors, 1);
}

#[test]
fn test_disabled_package_is_reported_but_not_folded() {
    let report = PackageAggregator::default()
        .aggregate_dir(&fixtures_dir().join("packages/studio"), &studio_seed())
        .unwrap();

    let disabled = report.packages.iter().find(|p| p.name == "disabled").unwrap();
    assert!(!disabled.enabled);
    assert_eq!(
        disabled.environment.get("HOUDINI_PATH").unwrap(),
        ["/studio/disabled"]
    );
    assert!(
        !report
            .environment
            .get("HOUDINI_PATH")
            .unwrap()
            .contains(&"/studio/disabled".to_string())
    );
}

#[test]
fn test_bindings_carry_across_packages() {
    let dir = fixtures_dir().join("packages/chained");

    let carried = PackageAggregator::default()
        .aggregate_dir(&dir, &SeedMapping::new())
        .unwrap();
    assert_eq!(
        carried.environment.get("HOUDINI_PATH").unwrap(),
        ["/studio/tools/houdini", "&"]
    );
    // Later redefinition inside the second package wins from there on
    assert_eq!(carried.environment.get("LATE").unwrap(), ["/override/late"]);
    assert_eq!(
        carried.environment.get("STUDIO").unwrap(),
        ["/studio", "/override"]
    );

    let isolated = PackageAggregator::default()
        .carry_bindings(false)
        .aggregate_dir(&dir, &SeedMapping::new())
        .unwrap();
    assert_eq!(
        isolated.environment.get("HOUDINI_PATH").unwrap(),
        ["$STUDIO_TOOLS/houdini", "&"]
    );
}
