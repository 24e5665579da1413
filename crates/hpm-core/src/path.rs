//! Paths from a document root to a leaf
//!
//! A [`NodePath`] is the chain of mapping keys and sequence indices that
//! leads to one scalar. It renders in the familiar dotted form:
//!
//! ```
//! use hpm_core::path::{NodePath, PathSegment};
//!
//! let path = NodePath::from(vec![
//!     PathSegment::key("env"),
//!     PathSegment::Index(2),
//!     PathSegment::key("PATH"),
//!     PathSegment::key("value"),
//!     PathSegment::Index(0),
//! ]);
//! assert_eq!(path.to_string(), "env[2].PATH.value[0]");
//! ```

use std::fmt;

use serde::{Serialize, Serializer};

use crate::package::ENABLE_KEY;

/// Name of the top-level block whose entries the host honours as variables.
pub const ENV_BLOCK: &str = "env";

/// Key holding the value list of a `{"NAME": {"method": .., "value": ..}}` entry.
pub const VALUE_KEY: &str = "value";

/// Key selecting how a value block combines with the existing variable.
pub const METHOD_KEY: &str = "method";

/// Structural keys of a package file. These never name a variable.
const CONTROL_KEYS: [&str; 4] = [ENV_BLOCK, ENABLE_KEY, METHOD_KEY, VALUE_KEY];

/// A segment of a path - either a key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A key in a mapping (e.g., "PATH" in `env[0].PATH`)
    Key(String),
    /// An index in a sequence (e.g., 0 in `env[0]`)
    Index(usize),
}

impl PathSegment {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// The key text, if this segment is a mapping key.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            Self::Index(_) => None,
        }
    }
}

/// Which part of a package file an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Inside the top-level `env` sequence
    Env,
    /// Anywhere else in the document
    TopLevel,
}

/// An ordered chain of segments from the document root to a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// The variable a scalar at this path defines, if any.
    ///
    /// This is the "name" half of a name/value pair: `env[0].FOO` and
    /// `env[1].FOO.value` both define `FOO`. List items such as
    /// `env[2].PATH.value[0]` define nothing, and control keys like `method`
    /// never do.
    pub fn binding_name(&self) -> Option<&str> {
        let name = match self.0.as_slice() {
            [.., PathSegment::Key(name), PathSegment::Key(value)] if value == VALUE_KEY => name,
            [.., PathSegment::Key(name)] => name,
            _ => return None,
        };
        (!CONTROL_KEYS.contains(&name.as_str())).then_some(name.as_str())
    }

    /// Scope of origin, as used by the alias normalizer.
    pub fn scope(&self) -> Scope {
        match self.0.first() {
            Some(PathSegment::Key(key)) if key == ENV_BLOCK => Scope::Env,
            _ => Scope::TopLevel,
        }
    }
}

impl From<Vec<PathSegment>> for NodePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for NodePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
