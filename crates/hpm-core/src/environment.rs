//! The resolved environment mapping
//!
//! [`EnvMap`] maps a variable name to an ordered list of values. Values are
//! unique per key and keep the position of their first occurrence.

use indexmap::IndexMap;
use serde::Serialize;

/// Path list separator used in package values.
pub const LIST_SEPARATOR: char = ';';

/// Variable name to ordered, duplicate-free values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EnvMap(IndexMap<String, Vec<String>>);

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `key` unless it is already present.
    ///
    /// Returns `true` if the value was added.
    pub fn push(&mut self, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let values = self.0.entry(key.to_string()).or_default();
        if values.contains(&value) {
            return false;
        }
        values.push(value);
        true
    }

    /// Append several values under `key`, suppressing duplicates.
    ///
    /// The key is created even if `values` is empty.
    pub fn extend<I, S>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.entry(key.to_string()).or_default();
        for value in values {
            self.push(key, value);
        }
    }

    /// Fold `other` into this map: new keys go last, new values go after
    /// existing ones.
    pub fn merge(&mut self, other: &EnvMap) {
        for (key, values) in &other.0 {
            self.extend(key, values.iter().cloned());
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for EnvMap {
    fn from_iter<T: IntoIterator<Item = (K, Vec<String>)>>(iter: T) -> Self {
        let mut map = EnvMap::new();
        for (key, values) in iter {
            let key: String = key.into();
            map.extend(&key, values);
        }
        map
    }
}

/// Split a resolved value into its list items, dropping empty pieces.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
}
