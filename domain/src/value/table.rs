//! String-keyed tables of tagged values.

use super::tagged::TaggedValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map;

/// A mapping from string key to [`TaggedValue`].
///
/// Keys are unique and iteration order is unspecified. A table may nest
/// other tables through [`TaggedValue::Table`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableObject {
    entries: HashMap<String, TaggedValue>,
}

impl TableObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<TaggedValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Insert an entry, returning the value it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<TaggedValue>,
    ) -> Option<TaggedValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&TaggedValue> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<TaggedValue> {
        self.entries.remove(key)
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

    pub fn iter(&self) -> hash_map::Iter<'_, String, TaggedValue> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Keys in sorted order, for stable display.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys
    }
}

impl<'a> IntoIterator for &'a TableObject {
    type Item = (&'a String, &'a TaggedValue);
    type IntoIter = hash_map::Iter<'a, String, TaggedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for TableObject {
    type Item = (String, TaggedValue);
    type IntoIter = hash_map::IntoIter<String, TaggedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<TaggedValue>> FromIterator<(K, V)> for TableObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
