//! Saved hconfig output in test-fixtures/

use std::path::PathBuf;

use hpm_host::load_snapshot_file;
use pretty_assertions::assert_eq;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

#[test]
fn test_load_saved_hconfig_output() {
    let seed = load_snapshot_file(&fixtures_dir().join("snapshots/hconfig-20.0.txt")).unwrap();

    assert_eq!(
        seed.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["HFS", "HH", "HOUDINI_USER_PREF_DIR", "HOUDINI_PATH", "HOUDINI_VERSION"]
    );
    assert_eq!(seed["HFS"], "/opt/hfs20.0.547");
    assert_eq!(seed["HOUDINI_PATH"], "&");
}

#[test]
fn test_missing_snapshot_file_is_io_error() {
    let err = load_snapshot_file(&fixtures_dir().join("snapshots/nope.txt")).unwrap_err();
    assert!(matches!(err, hpm_host::HostError::Io(_)));
}
