//! Ordered map type for TOON objects.
//!
//! This module provides [`ToonMap`], a thin wrapper around [`IndexMap`] that
//! preserves insertion order. Key order is a correctness requirement (§3,
//! §9), not a cosmetic choice: the encoder emits keys in insertion order and
//! the decoder must reconstruct that same order, so a `HashMap` is not an
//! option anywhere on either path.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::value::Value;

/// An insertion-ordered string-keyed map of [`Value`]s.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToonMap(IndexMap<String, Value>);

impl ToonMap {
    pub fn new() -> Self {
        ToonMap(IndexMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ToonMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value if the key
    /// already existed. Re-inserting an existing key does not move it.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Keys common to every object in `objects`, in the order they first
    /// appear across the slice. Used by the tabular-eligibility check (§4.3).
    pub fn common_keys<'a>(objects: &'a [ToonMap]) -> Vec<&'a str> {
        let Some(first) = objects.first() else {
            return Vec::new();
        };
        first
            .keys()
            .map(|k| k.as_str())
            .filter(|k| objects[1..].iter().all(|o| o.contains_key(k)))
            .collect()
    }
}

impl From<HashMap<String, Value>> for ToonMap {
    fn from(map: HashMap<String, Value>) -> Self {
        ToonMap(map.into_iter().collect())
    }
}

impl From<ToonMap> for HashMap<String, Value> {
    fn from(map: ToonMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for ToonMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ToonMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for ToonMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        ToonMap(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let mut m = ToonMap::new();
        m.insert("z".into(), Value::number(1.0));
        m.insert("a".into(), Value::number(2.0));
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn common_keys_intersects_without_requiring_identical_sets() {
        let mut a = ToonMap::new();
        a.insert("id".into(), Value::number(1.0));
        a.insert("name".into(), Value::from("Alice"));
        let mut b = ToonMap::new();
        b.insert("id".into(), Value::number(2.0));
        b.insert("extra".into(), Value::Bool(true));

        let common = ToonMap::common_keys(&[a, b]);
        assert_eq!(common, vec!["id"]);
    }
}
