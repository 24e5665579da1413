//! Package configuration documents
//!
//! A [`ConfigDocument`] is the closed three-kind tree every package file is
//! reduced to: ordered mappings, sequences, and string scalars. Numbers and
//! booleans keep their literal JSON text; anything else is rejected.

use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::path::{NodePath, PathSegment};

/// A single backslash between two non-backslash characters.
static LONE_BACKSLASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\\])\\([^\\])").unwrap());
/// A comma directly before a closing bracket or brace.
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\s*[\]}])").unwrap());
/// Two objects with nothing between them.
static MISSING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}\s*\{").unwrap());

/// A parsed package configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigDocument {
    /// Ordered sequence of children
    Sequence(Vec<ConfigDocument>),
    /// Mapping of key to child, in insertion order
    Mapping(IndexMap<String, ConfigDocument>),
    /// Leaf value, as literal text
    Scalar(String),
}

/// Outcome of lenient parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub document: ConfigDocument,
    /// True when the text only parsed after repairs were applied
    pub repaired: bool,
}

impl ConfigDocument {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Parse strict JSON text.
    pub fn parse(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_json(&value)
    }

    /// Parse JSON text, repairing common hand-editing mistakes if needed.
    ///
    /// Repairs are only attempted when strict parsing fails: unescaped
    /// backslashes in Windows paths, trailing commas, and missing commas
    /// between adjacent objects.
    pub fn parse_lenient(source: &str) -> Result<Parsed> {
        match serde_json::from_str::<Value>(source) {
            Ok(value) => Ok(Parsed {
                document: Self::from_json(&value)?,
                repaired: false,
            }),
            Err(strict) => {
                let repaired = repair_json(source);
                let value: Value = serde_json::from_str(&repaired).map_err(|_| {
                    Error::parse("JSON", strict.to_string())
                })?;
                Ok(Parsed {
                    document: Self::from_json(&value)?,
                    repaired: true,
                })
            }
        }
    }

    /// Read and leniently parse a package file.
    pub fn load(path: &Path) -> Result<Parsed> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        Self::parse_lenient(&source)
    }

    /// Convert a JSON value into the three permitted node kinds.
    pub fn from_json(value: &Value) -> Result<Self> {
        convert(value, &NodePath::root())
    }

    /// Get the node at the given path.
    pub fn get(&self, segments: &[PathSegment]) -> Option<&ConfigDocument> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(self);
        };

        let next = match (first, self) {
            (PathSegment::Key(key), Self::Mapping(map)) => map.get(key)?,
            (PathSegment::Index(idx), Self::Sequence(items)) => items.get(*idx)?,
            _ => return None,
        };

        next.get(rest)
    }

    /// Number of scalars in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Sequence(items) => items.iter().map(Self::leaf_count).sum(),
            Self::Mapping(map) => map.values().map(Self::leaf_count).sum(),
        }
    }
}

fn convert(value: &Value, at: &NodePath) -> Result<ConfigDocument> {
    match value {
        Value::String(s) => Ok(ConfigDocument::Scalar(s.clone())),
        Value::Number(n) => Ok(ConfigDocument::Scalar(n.to_string())),
        Value::Bool(b) => Ok(ConfigDocument::Scalar(b.to_string())),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| convert(item, &at.child(PathSegment::Index(i))))
            .collect::<Result<Vec<_>>>()
            .map(ConfigDocument::Sequence),
        Value::Object(map) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (key, item) in map {
                let child = convert(item, &at.child(PathSegment::key(key.clone())))?;
                out.insert(key.clone(), child);
            }
            Ok(ConfigDocument::Mapping(out))
        }
        Value::Null => Err(Error::UnsupportedNode {
            path: at.to_string(),
            kind: "null",
        }),
    }
}

/// Apply the text repairs used by [`ConfigDocument::parse_lenient`].
pub fn repair_json(source: &str) -> String {
    let text = LONE_BACKSLASH.replace_all(source, r"${1}\\${2}");
    let text = TRAILING_COMMA.replace_all(&text, "${1}");
    MISSING_COMMA.replace_all(&text, "}, {").into_owned()
}
