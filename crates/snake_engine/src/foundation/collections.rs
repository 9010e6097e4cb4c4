//! Specialized collection types

use std::collections::HashMap;

pub use slotmap::{Key, SlotMap};

/// Slot map storage with a string tag index
///
/// Values live in a [`SlotMap`] so handles stay stable across removals.
/// Each value may be reachable through one unique tag; untagged values
/// (generated text meshes, for instance) are only reachable by handle.
#[derive(Debug)]
pub struct TaggedMap<K: Key, V> {
    items: SlotMap<K, V>,
    tags: HashMap<String, K>,
}

impl<K: Key, V> Default for TaggedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V> TaggedMap<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            items: SlotMap::with_key(),
            tags: HashMap::new(),
        }
    }

    /// Insert under `tag`. Returns `None` and leaves the map untouched if
    /// the tag is already taken.
    pub fn insert_tagged(&mut self, tag: &str, value: V) -> Option<K> {
        if self.tags.contains_key(tag) {
            return None;
        }
        let key = self.items.insert(value);
        self.tags.insert(tag.to_string(), key);
        Some(key)
    }

    /// Insert without a tag
    pub fn insert(&mut self, value: V) -> K {
        self.items.insert(value)
    }

    /// Remove the value registered under `tag`
    pub fn remove_tagged(&mut self, tag: &str) -> Option<(K, V)> {
        let key = self.tags.remove(tag)?;
        self.items.remove(key).map(|value| (key, value))
    }

    /// Remove by handle, dropping any tag pointing at it
    pub fn remove(&mut self, key: K) -> Option<V> {
        let value = self.items.remove(key)?;
        self.tags.retain(|_, k| *k != key);
        Some(value)
    }

    /// Handle registered under `tag`
    pub fn key_of(&self, tag: &str) -> Option<K> {
        self.tags.get(tag).copied()
    }

    /// Tag of a handle, if it has one
    pub fn tag_of(&self, key: K) -> Option<&str> {
        self.tags
            .iter()
            .find_map(|(tag, k)| (*k == key).then_some(tag.as_str()))
    }

    /// Whether `tag` is registered
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Value for a handle
    pub fn get(&self, key: K) -> Option<&V> {
        self.items.get(key)
    }

    /// Mutable value for a handle
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.items.get_mut(key)
    }

    /// Value registered under `tag`
    pub fn get_by_tag(&self, tag: &str) -> Option<&V> {
        self.key_of(tag).and_then(|key| self.items.get(key))
    }

    /// Number of stored values, tagged or not
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over all handles and values
    pub fn iter(&self) -> slotmap::basic::Iter<'_, K, V> {
        self.items.iter()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.items.clear();
        self.tags.clear();
    }
}
