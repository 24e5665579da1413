//! Flattening a document into ordered leaf entries
//!
//! Entries come out in pre-order: mapping keys in insertion order, sequence
//! elements in index order. Nothing is reordered or deduplicated here; that
//! order is the only scoping signal the resolver has.

use indexmap::IndexMap;
use serde::Serialize;

use crate::document::ConfigDocument;
use crate::error::{Error, Result};
use crate::path::{NodePath, PathSegment};

/// One scalar together with the path that leads to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatEntry {
    pub path: NodePath,
    pub value: String,
}

impl FlatEntry {
    pub fn new(path: impl Into<NodePath>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Flatten a document into its leaves, in document order.
pub fn flatten(document: &ConfigDocument) -> Vec<FlatEntry> {
    let mut out = Vec::with_capacity(document.leaf_count());
    walk(document, &NodePath::root(), &mut out);
    out
}

fn walk(node: &ConfigDocument, at: &NodePath, out: &mut Vec<FlatEntry>) {
    match node {
        ConfigDocument::Scalar(value) => out.push(FlatEntry::new(at.clone(), value.clone())),
        ConfigDocument::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                walk(item, &at.child(PathSegment::Index(i)), out);
            }
        }
        ConfigDocument::Mapping(map) => {
            for (key, item) in map {
                walk(item, &at.child(PathSegment::key(key.clone())), out);
            }
        }
    }
}

/// Re-nest flattened entries into a document.
///
/// This is the inverse of [`flatten`] for documents without empty
/// containers (those produce no leaves and cannot be recovered).
pub fn unflatten(entries: &[FlatEntry]) -> Result<ConfigDocument> {
    if entries.is_empty() {
        return Err(Error::InconsistentPaths {
            path: NodePath::root().to_string(),
            reason: "no entries".to_string(),
        });
    }
    build(entries, 0)
}

fn build(entries: &[FlatEntry], depth: usize) -> Result<ConfigDocument> {
    let first = &entries[0];
    let inconsistent = |reason: &str| Error::InconsistentPaths {
        path: first.path.to_string(),
        reason: reason.to_string(),
    };

    match first.path.segments().get(depth) {
        None => {
            if entries.len() != 1 {
                return Err(inconsistent("a scalar and a container share a path"));
            }
            Ok(ConfigDocument::Scalar(first.value.clone()))
        }
        Some(PathSegment::Key(_)) => {
            let mut map = IndexMap::new();
            for run in runs(entries, depth) {
                let Some(PathSegment::Key(key)) = run[0].path.segments().get(depth) else {
                    return Err(inconsistent("mixed keys and indices at one level"));
                };
                if map.contains_key(key) {
                    return Err(inconsistent("key appears in two separate runs"));
                }
                map.insert(key.clone(), build(run, depth + 1)?);
            }
            Ok(ConfigDocument::Mapping(map))
        }
        Some(PathSegment::Index(_)) => {
            let mut items = Vec::new();
            for run in runs(entries, depth) {
                match run[0].path.segments().get(depth) {
                    Some(PathSegment::Index(idx)) if *idx == items.len() => {
                        items.push(build(run, depth + 1)?);
                    }
                    Some(PathSegment::Index(_)) => {
                        return Err(inconsistent("sequence indices are not contiguous"));
                    }
                    _ => return Err(inconsistent("mixed keys and indices at one level")),
                }
            }
            Ok(ConfigDocument::Sequence(items))
        }
    }
}

/// Split entries into maximal runs sharing the segment at `depth`.
fn runs(entries: &[FlatEntry], depth: usize) -> Vec<&[FlatEntry]> {
    let mut out = Vec::new();
    let mut start = 0;
    for i in 1..=entries.len() {
        let boundary = i == entries.len()
            || entries[i].path.segments().get(depth) != entries[start].path.segments().get(depth);
        if boundary {
            out.push(&entries[start..i]);
            start = i;
        }
    }
    out
}
