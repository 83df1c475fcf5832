//! Property sets
//!
//! A flat string-to-string mapping. Insertion order is kept so that dumps
//! are stable, but it carries no meaning: two sets with the same entries
//! compare equal regardless of order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reserved key whose value is a further location list to load
pub const PROPERTY_LOCATIONS: &str = "propertyLocations";

/// A set of string properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet {
    entries: IndexMap<String, String>,
}

impl PropertySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The nested location list declared by this set, if any
    pub fn locations(&self) -> Option<&str> {
        self.get(PROPERTY_LOCATIONS)
    }

    /// Copy every entry of `other` into this set; `other` wins on conflict
    pub fn extend_overriding(&mut self, other: PropertySet) {
        self.entries.extend(other.entries);
    }

    /// Copy the entries of `other` whose keys this set lacks
    ///
    /// Values already present are never replaced.
    pub fn merge_without_overwrite(&mut self, other: PropertySet) {
        for (key, value) in other.entries {
            self.entries.entry(key).or_insert(value);
        }
    }

    /// Apply `f` to every value in key order, storing each result before
    /// the next value is visited
    pub(crate) fn rewrite_values<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &PropertySet) -> Option<String>,
    {
        for index in 0..self.entries.len() {
            let rewritten = match self.entries.get_index(index) {
                Some((_, value)) => f(value.as_str(), self),
                None => None,
            };
            if let (Some(new_value), Some((_, value))) =
                (rewritten, self.entries.get_index_mut(index))
            {
                *value = new_value;
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for PropertySet {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
