//! Variable resolution over flattened entries
//!
//! A single left-to-right pass. Each `$NAME` token is replaced by the value
//! of the nearest preceding entry that defines `NAME`, falling back to
//! values inherited from earlier packages and then to the host's seed
//! mapping. Substituted text is never scanned again.

use indexmap::IndexMap;
use serde::Serialize;

use crate::flatten::FlatEntry;
use crate::path::{NodePath, Scope};

/// Base variables supplied by the host application.
pub type SeedMapping = IndexMap<String, String>;

/// A variable definition seen during the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableBinding {
    pub name: String,
    /// Value after substitution
    pub value: String,
    /// Ordinal position of the defining entry
    pub defined_at: usize,
    /// Whether the definition sits inside the `env` block
    pub scope: Scope,
}

/// Where a resolved reference got its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// An earlier entry of the same document
    Document,
    /// A binding carried over from a previously resolved package
    Inherited,
    /// The host's seed mapping
    Seed,
}

/// An entry after substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    pub path: NodePath,
    pub value: String,
    pub ordinal: usize,
    /// Names referenced by this entry that could not be resolved
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub undefined: Vec<String>,
}

/// The variable sources available to one resolution pass.
///
/// Bindings accumulate as the pass advances; the seed and the inherited
/// values are read-only.
#[derive(Debug)]
pub struct ResolutionContext<'a> {
    seed: &'a SeedMapping,
    inherited: Option<&'a SeedMapping>,
    bindings: Vec<VariableBinding>,
    normalize_separators: bool,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(seed: &'a SeedMapping) -> Self {
        Self {
            seed,
            inherited: None,
            bindings: Vec::new(),
            normalize_separators: true,
        }
    }

    /// Add bindings carried over from packages resolved earlier.
    pub fn with_inherited(mut self, inherited: &'a SeedMapping) -> Self {
        self.inherited = Some(inherited);
        self
    }

    /// Toggle backslash-to-slash folding of path-like values.
    pub fn normalize_separators(mut self, enabled: bool) -> Self {
        self.normalize_separators = enabled;
        self
    }

    /// Look up `name` as seen from the current position of the pass.
    pub fn lookup(&self, name: &str) -> Option<(String, BindingSource)> {
        if let Some(binding) = self.bindings.iter().rev().find(|b| b.name == name) {
            return Some((binding.value.clone(), BindingSource::Document));
        }
        if let Some(value) = self.inherited.and_then(|m| m.get(name)) {
            return Some((value.clone(), BindingSource::Inherited));
        }
        self.seed.get(name).map(|value| {
            let value = if self.normalize_separators {
                normalize_separators(value)
            } else {
                value.clone()
            };
            (value, BindingSource::Seed)
        })
    }

    pub fn bindings(&self) -> &[VariableBinding] {
        &self.bindings
    }

    pub fn into_bindings(self) -> Vec<VariableBinding> {
        self.bindings
    }

    /// Resolve every entry, in order, extending the bindings as it goes.
    pub fn resolve(&mut self, entries: &[FlatEntry]) -> Vec<ResolvedEntry> {
        let mut out = Vec::with_capacity(entries.len());
        for (ordinal, entry) in entries.iter().enumerate() {
            let raw = if self.normalize_separators {
                normalize_separators(&entry.value)
            } else {
                entry.value.clone()
            };

            let mut undefined = Vec::new();
            let value = substitute(&raw, |name| match self.lookup(name) {
                Some((value, _)) => Some(value),
                None => {
                    if !undefined.iter().any(|n| n == name) {
                        undefined.push(name.to_string());
                    }
                    None
                }
            });

            if let Some(name) = entry.path.binding_name() {
                self.bindings.push(VariableBinding {
                    name: name.to_string(),
                    value: value.clone(),
                    defined_at: ordinal,
                    scope: entry.path.scope(),
                });
            }

            out.push(ResolvedEntry {
                path: entry.path.clone(),
                value,
                ordinal,
                undefined,
            });
        }
        out
    }
}

/// Resolve entries against a seed mapping with default options.
pub fn resolve_entries(entries: &[FlatEntry], seed: &SeedMapping) -> Vec<ResolvedEntry> {
    ResolutionContext::new(seed).resolve(entries)
}

/// Replace each `$NAME` token in `text` using `lookup`.
///
/// Tokens the lookup cannot satisfy are kept verbatim. A `$` not followed by
/// a name character is literal text.
pub fn substitute(text: &str, mut lookup: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        let name_len = after
            .char_indices()
            .find(|(_, c)| !is_name_char(*c))
            .map_or(after.len(), |(i, _)| i);

        if name_len == 0 {
            out.push('$');
        } else {
            let name = &after[..name_len];
            match lookup(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
        }
        rest = &after[name_len..];
    }

    out.push_str(rest);
    out
}

/// Names referenced by `text`, left to right, including repeats.
pub fn references(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    substitute(text, |name| {
        names.push(name.to_string());
        None
    });
    names
}

/// Fold Windows separators into forward slashes for path-like values.
pub fn normalize_separators(value: &str) -> String {
    if value.contains('\\') || value.contains('/') {
        value.replace('\\', "/")
    } else {
        value.to_string()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
