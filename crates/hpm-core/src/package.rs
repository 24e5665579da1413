//! Resolving a single package file
//!
//! Runs load → flatten → resolve → normalize for one file and collects every
//! fault as a [`Diagnostic`] stamped with that file. A broken file yields an
//! empty result rather than an error.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::alias::{AliasNormalizer, AliasTable, HOUDINI_PATH};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::document::{ConfigDocument, Parsed};
use crate::environment::EnvMap;
use crate::error::Result;
use crate::flatten::flatten;
use crate::path::{PathSegment, Scope};
use crate::resolve::{ResolutionContext, SeedMapping, VariableBinding};

/// Top-level key that switches a package on or off.
pub const ENABLE_KEY: &str = "enable";

/// Marker Houdini expands to its default search path.
pub const DEFAULT_PATH_MARKER: &str = "&";

/// Knobs shared by every package of one scan.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Fold backslashes to forward slashes before resolving
    pub normalize_separators: bool,
    pub aliases: AliasTable,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            normalize_separators: true,
            aliases: AliasTable::houdini(),
        }
    }
}

/// Everything learned from one package file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageResolution {
    /// File stem, e.g. `SideFXLabs` for `SideFXLabs.json`
    pub name: String,
    pub source: PathBuf,
    pub enabled: bool,
    pub environment: EnvMap,
    pub misplaced: EnvMap,
    pub plugin_paths: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub bindings: Vec<VariableBinding>,
}

impl PackageResolution {
    fn empty(source: &Path) -> Self {
        Self {
            name: package_name(source),
            source: source.to_path_buf(),
            enabled: true,
            environment: EnvMap::new(),
            misplaced: EnvMap::new(),
            plugin_paths: Vec::new(),
            diagnostics: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// The last value of every variable defined in the `env` block.
    ///
    /// Packages resolved later in the same installation may refer to these.
    pub fn exported(&self) -> SeedMapping {
        let mut out = SeedMapping::new();
        for binding in self.bindings.iter().filter(|b| b.scope == Scope::Env) {
            out.insert(binding.name.clone(), binding.value.clone());
        }
        out
    }

    /// True if the file could not be used at all.
    pub fn is_malformed(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::MalformedDocument { .. }))
    }
}

/// Resolves package files against one seed mapping.
#[derive(Debug, Clone, Copy)]
pub struct PackageContext<'a> {
    seed: &'a SeedMapping,
    inherited: Option<&'a SeedMapping>,
    options: &'a PackageOptions,
}

impl<'a> PackageContext<'a> {
    pub fn new(seed: &'a SeedMapping, options: &'a PackageOptions) -> Self {
        Self {
            seed,
            inherited: None,
            options,
        }
    }

    /// Make bindings exported by earlier packages visible.
    pub fn with_inherited(mut self, inherited: &'a SeedMapping) -> Self {
        self.inherited = Some(inherited);
        self
    }

    /// Load and resolve a package file.
    pub fn resolve_file(&self, path: &Path) -> PackageResolution {
        debug!(path = %path.display(), "Resolving package");
        self.resolve_parsed(path, ConfigDocument::load(path))
    }

    /// Resolve package text that did not come from disk. `source` is only
    /// used for naming and diagnostics.
    pub fn resolve_str(&self, source: &Path, text: &str) -> PackageResolution {
        self.resolve_parsed(source, ConfigDocument::parse_lenient(text))
    }

    fn resolve_parsed(&self, source: &Path, parsed: Result<Parsed>) -> PackageResolution {
        match parsed {
            Ok(parsed) => {
                let mut resolution = self.resolve_document(source, &parsed.document);
                if parsed.repaired {
                    resolution
                        .diagnostics
                        .insert(0, Diagnostic::repaired_document().in_file(source));
                }
                resolution
            }
            Err(e) => {
                debug!(path = %source.display(), error = %e, "Package is malformed");
                let mut resolution = PackageResolution::empty(source);
                resolution
                    .diagnostics
                    .push(Diagnostic::malformed_document(e.to_string()).in_file(source));
                resolution
            }
        }
    }

    /// Resolve an already parsed document.
    pub fn resolve_document(&self, source: &Path, document: &ConfigDocument) -> PackageResolution {
        let entries = flatten(document);

        let mut context = ResolutionContext::new(self.seed)
            .normalize_separators(self.options.normalize_separators);
        if let Some(inherited) = self.inherited {
            context = context.with_inherited(inherited);
        }
        let resolved = context.resolve(&entries);

        let mut diagnostics = Vec::new();
        for entry in &resolved {
            for name in &entry.undefined {
                diagnostics.push(Diagnostic::undefined_variable(name, entry.path.clone()));
            }
        }

        let normalized = AliasNormalizer::new(&self.options.aliases).normalize(&resolved);
        diagnostics.extend(normalized.diagnostics);

        let plugin_paths = plugin_paths(&normalized.environment);
        PackageResolution {
            enabled: is_enabled(document),
            environment: normalized.environment,
            misplaced: normalized.misplaced,
            plugin_paths,
            diagnostics: diagnostics.into_iter().map(|d| d.in_file(source)).collect(),
            bindings: context.into_bindings(),
            ..PackageResolution::empty(source)
        }
    }
}

/// Whether the host would load this package.
///
/// Only an explicit `false` disables a package. Expressions and other values
/// are left to the host and count as enabled.
pub fn is_enabled(document: &ConfigDocument) -> bool {
    match document.get(&[PathSegment::key(ENABLE_KEY)]) {
        Some(ConfigDocument::Scalar(value)) => !value.trim().eq_ignore_ascii_case("false"),
        _ => true,
    }
}

/// Search-path entries contributed by a package, without the default marker.
pub fn plugin_paths(environment: &EnvMap) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in environment.get(HOUDINI_PATH).unwrap_or_default() {
        if value == DEFAULT_PATH_MARKER {
            continue;
        }
        let trimmed = match value.trim_end_matches('/') {
            "" => value.as_str(),
            trimmed => trimmed,
        };
        if !out.iter().any(|p| p == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

fn package_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn seed() -> SeedMapping {
        SeedMapping::from([
            ("HOUDINI_PACKAGE_PATH".to_string(), "/prefs/packages".to_string()),
            ("HFS".to_string(), "/opt/hfs19.5".to_string()),
        ])
    }

    fn resolve(text: &str) -> PackageResolution {
        let seed = seed();
        let options = PackageOptions::default();
        PackageContext::new(&seed, &options).resolve_str(Path::new("/prefs/packages/labs.json"), text)
    }

    #[test]
    fn test_resolves_labs_style_package() {
        let result = resolve(
            r#"{
                "enable": true,
                "env": [
                    {"SIDEFXLABS": "$HOUDINI_PACKAGE_PATH/SideFXLabs"},
                    {"PATH": {"method": "prepend", "value": ["$SIDEFXLABS/bin"]}}
                ],
                "path": "$SIDEFXLABS"
            }"#,
        );

        assert_eq!(result.name, "labs");
        assert!(result.enabled);
        assert_eq!(
            result.environment.get("SIDEFXLABS").unwrap(),
            ["/prefs/packages/SideFXLabs"]
        );
        assert_eq!(
            result.environment.get("PATH").unwrap(),
            ["/prefs/packages/SideFXLabs/bin"]
        );
        assert_eq!(
            result.misplaced.get("path").unwrap(),
            ["/prefs/packages/SideFXLabs"]
        );
        assert!(result.plugin_paths.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics[0].file.as_deref(),
            Some(Path::new("/prefs/packages/labs.json"))
        );
    }

    #[test]
    fn test_undefined_variable_keeps_token_and_reports() {
        let result = resolve(r#"{"env": [{"A": "$NOVAR/x"}]}"#);
        assert_eq!(result.environment.get("A").unwrap(), ["$NOVAR/x"]);
        assert_eq!(
            result.diagnostics[0].kind,
            DiagnosticKind::UndefinedVariable {
                name: "NOVAR".to_string()
            }
        );
        assert_eq!(
            result.diagnostics[0].path.as_ref().map(ToString::to_string),
            Some("env[0].A".to_string())
        );
    }

    #[test]
    fn test_malformed_package_contributes_nothing() {
        let result = resolve(r#"{"env": [{"A": null}]}"#);
        assert!(result.is_malformed());
        assert!(result.environment.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_file_and_text_report_malformed_alike() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        let text = r#"{"env": [{"A": "1"}"#;
        std::fs::write(&path, text).unwrap();

        let seed = seed();
        let options = PackageOptions::default();
        let context = PackageContext::new(&seed, &options);
        let from_file = context.resolve_file(&path);
        let from_text = context.resolve_str(&path, text);

        assert!(from_file.is_malformed());
        assert_eq!(from_file, from_text);
        assert_eq!(from_file.diagnostics[0].file.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_repaired_package_is_flagged() {
        let result = resolve(r#"{"env": [{"A": "1"},]}"#);
        assert!(!result.is_malformed());
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::RepairedDocument);
        assert_eq!(result.environment.get("A").unwrap(), ["1"]);
    }

    #[test]
    fn test_plugin_paths_drop_marker_and_trailing_slash() {
        let result = resolve(r#"{"env": [{"HOUDINI_PATH": "$HFS/packages/x/;&"}, {"hpath": "/y"}]}"#);
        assert_eq!(result.plugin_paths, vec!["/opt/hfs19.5/packages/x", "/y"]);
        assert_eq!(
            result.environment.get(HOUDINI_PATH).unwrap(),
            ["/opt/hfs19.5/packages/x/", "&", "/y"]
        );
    }

    #[test]
    fn test_exported_only_carries_env_bindings() {
        let result = resolve(r#"{"name": "x", "env": [{"A": "1"}, {"A": "2"}]}"#);
        let exported = result.exported();
        assert_eq!(exported.get("A").map(String::as_str), Some("2"));
        assert!(!exported.contains_key("name"));
    }

    #[rstest]
    #[case(r#"{"enable": false}"#, false)]
    #[case(r#"{"enable": "False"}"#, false)]
    #[case(r#"{"enable": true}"#, true)]
    #[case(r#"{"enable": "houdini_version >= '19.5'"}"#, true)]
    #[case(r#"{"env": []}"#, true)]
    fn test_is_enabled(#[case] text: &str, #[case] expected: bool) {
        let doc = ConfigDocument::parse(text).unwrap();
        assert_eq!(is_enabled(&doc), expected);
    }
}
