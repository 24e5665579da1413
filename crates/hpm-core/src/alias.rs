//! Alias normalization
//!
//! Houdini has accepted several names for its search-path list over the
//! years. The [`AliasTable`] maps each deprecated name to the canonical one,
//! and the [`AliasNormalizer`] folds the resolved entries of one package into
//! an [`EnvMap`] keyed by canonical names only.
//!
//! Only entries inside the `env` block are honoured. Alias keys found
//! anywhere else are kept in a separate `misplaced` map and reported.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostic::Diagnostic;
use crate::environment::{EnvMap, split_list};
use crate::path::{ENV_BLOCK, NodePath, PathSegment, Scope, VALUE_KEY};
use crate::resolve::ResolvedEntry;

/// The canonical search-path variable.
pub const HOUDINI_PATH: &str = "HOUDINI_PATH";

/// What happens when a deprecated key is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasDisposition {
    /// Fold into the canonical key, reporting when the canonical key or
    /// another alias of it is also present
    #[default]
    Merge,
    /// Ignore the deprecated values when the canonical key is present
    RejectIfCanonicalPresent,
    /// Fold into the canonical key and always report
    Warn,
}

/// One deprecated key and the canonical key it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    pub deprecated: String,
    pub canonical: String,
    #[serde(default)]
    pub disposition: AliasDisposition,
}

impl AliasRule {
    pub fn new(
        deprecated: impl Into<String>,
        canonical: impl Into<String>,
        disposition: AliasDisposition,
    ) -> Self {
        Self {
            deprecated: deprecated.into(),
            canonical: canonical.into(),
            disposition,
        }
    }
}

/// Lookup table of alias rules, keyed by deprecated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    rules: IndexMap<String, AliasRule>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::houdini()
    }
}

impl AliasTable {
    /// A table with no rules.
    pub fn empty() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// The rules Houdini itself applies to package files.
    pub fn houdini() -> Self {
        Self::empty()
            .with_rule(AliasRule::new("hpath", HOUDINI_PATH, AliasDisposition::Merge))
            .with_rule(AliasRule::new("path", HOUDINI_PATH, AliasDisposition::Merge))
    }

    /// Add a rule, replacing any existing rule for the same deprecated key.
    pub fn with_rule(mut self, rule: AliasRule) -> Self {
        self.rules.insert(rule.deprecated.clone(), rule);
        self
    }

    pub fn rule_for(&self, deprecated: &str) -> Option<&AliasRule> {
        self.rules.get(deprecated)
    }

    pub fn rules(&self) -> impl Iterator<Item = &AliasRule> {
        self.rules.values()
    }

    /// Canonical keys, each once, in rule order.
    pub fn canonical_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for rule in self.rules.values() {
            if !keys.contains(&rule.canonical.as_str()) {
                keys.push(&rule.canonical);
            }
        }
        keys
    }

    /// True for any key taking part in a rule, deprecated or canonical.
    pub fn is_alias_key(&self, key: &str) -> bool {
        self.rules.contains_key(key) || self.rules.values().any(|r| r.canonical == key)
    }
}

/// The values one key received at one place in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOccurrence {
    pub key: String,
    /// Path up to and including the key
    pub path: NodePath,
    pub scope: Scope,
    /// Resolved values, already split into list items
    pub values: Vec<String>,
}

/// Group resolved entries into key occurrences.
///
/// Inside the `env` block every variable is collected. Outside it only keys
/// the table knows about are kept, since those are the ones the host would
/// misread. Control keys such as `method` are skipped.
pub fn collect_occurrences(entries: &[ResolvedEntry], table: &AliasTable) -> Vec<KeyOccurrence> {
    let mut out: Vec<KeyOccurrence> = Vec::new();

    for entry in entries {
        let Some((key, prefix_len)) = variable_key(&entry.path) else {
            continue;
        };
        let scope = entry.path.scope();
        if scope == Scope::TopLevel && !table.is_alias_key(key) {
            continue;
        }

        let prefix = &entry.path.segments()[..prefix_len];
        let values = split_list(&entry.value).map(str::to_string);

        if let Some(last) = out
            .last_mut()
            .filter(|last| last.path.segments() == prefix)
        {
            last.values.extend(values);
        } else {
            out.push(KeyOccurrence {
                key: key.to_string(),
                path: NodePath::from(prefix.to_vec()),
                scope,
                values: values.collect(),
            });
        }
    }

    out
}

/// Locate the variable name an entry contributes to, and how many segments
/// lead up to it.
fn variable_key(path: &NodePath) -> Option<(&str, usize)> {
    let segments = path.segments();
    let at = match segments {
        [PathSegment::Key(block), PathSegment::Index(_), PathSegment::Key(_), ..]
            if block == ENV_BLOCK =>
        {
            2
        }
        [PathSegment::Key(block), PathSegment::Key(_), ..] if block == ENV_BLOCK => 1,
        [PathSegment::Key(block), ..] if block == ENV_BLOCK => return None,
        [PathSegment::Key(_), ..] => 0,
        _ => return None,
    };

    let key = segments[at].as_key()?;
    match segments.get(at + 1) {
        None | Some(PathSegment::Index(_)) => Some((key, at + 1)),
        Some(PathSegment::Key(next)) if next == VALUE_KEY => Some((key, at + 1)),
        Some(PathSegment::Key(_)) => None,
    }
}

/// Result of normalizing one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Variables the host honours, under canonical names
    pub environment: EnvMap,
    /// Alias keys found outside the `env` block, as written
    pub misplaced: EnvMap,
    pub diagnostics: Vec<Diagnostic>,
}

/// Folds resolved entries into a canonical environment mapping.
#[derive(Debug, Clone, Copy)]
pub struct AliasNormalizer<'a> {
    table: &'a AliasTable,
}

impl<'a> AliasNormalizer<'a> {
    pub fn new(table: &'a AliasTable) -> Self {
        Self { table }
    }

    pub fn normalize(&self, entries: &[ResolvedEntry]) -> Normalized {
        self.normalize_occurrences(collect_occurrences(entries, self.table))
    }

    pub fn normalize_occurrences(&self, occurrences: Vec<KeyOccurrence>) -> Normalized {
        let mut out = Normalized::default();

        let mut raw = EnvMap::new();
        let mut first_seen: IndexMap<String, NodePath> = IndexMap::new();
        for occurrence in occurrences {
            match occurrence.scope {
                Scope::Env => {
                    raw.extend(&occurrence.key, occurrence.values);
                    first_seen
                        .entry(occurrence.key)
                        .or_insert(occurrence.path);
                }
                Scope::TopLevel => {
                    out.misplaced.extend(&occurrence.key, occurrence.values);
                    out.diagnostics
                        .push(Diagnostic::misplaced_key(occurrence.key, occurrence.path));
                }
            }
        }

        let mut deferred = Vec::new();
        for (key, values) in raw.iter() {
            let Some(rule) = self.table.rule_for(key) else {
                out.environment.extend(key, values.iter().cloned());
                continue;
            };
            if raw.contains_key(&rule.canonical) {
                deferred.push((rule, values));
                continue;
            }

            out.environment
                .extend(&rule.canonical, values.iter().cloned());
            let shares_canonical = raw.keys().any(|other| {
                other != key
                    && self
                        .table
                        .rule_for(other)
                        .is_some_and(|r| r.canonical == rule.canonical)
            });
            if rule.disposition == AliasDisposition::Warn || shares_canonical {
                out.diagnostics.push(self.deprecated(rule, Vec::new(), &first_seen));
            }
        }

        for (rule, values) in deferred {
            let rejected = match rule.disposition {
                AliasDisposition::Merge | AliasDisposition::Warn => {
                    out.environment
                        .extend(&rule.canonical, values.iter().cloned());
                    Vec::new()
                }
                AliasDisposition::RejectIfCanonicalPresent => values.to_vec(),
            };
            out.diagnostics.push(self.deprecated(rule, rejected, &first_seen));
        }

        out
    }

    fn deprecated(
        &self,
        rule: &AliasRule,
        rejected: Vec<String>,
        first_seen: &IndexMap<String, NodePath>,
    ) -> Diagnostic {
        let diagnostic = Diagnostic::deprecated_key_used(&rule.deprecated, &rule.canonical, rejected);
        match first_seen.get(&rule.deprecated) {
            Some(path) => diagnostic.at(path.clone()),
            None => diagnostic,
        }
    }
}
