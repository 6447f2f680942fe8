//! Read-through value cache
//!
//! Holds the last known persisted value per key. An absent entry means "not
//! consulted yet" or "invalidated", never "known absent from storage".

use alloc::collections::BTreeMap;
use cfgstore_core::{KeyName, Value};
use core::mem::size_of;

/// Rough per-node overhead of a B-tree map entry
const NODE_OVERHEAD: usize = 3 * size_of::<usize>();

/// Cached values by key name
#[derive(Debug, Default)]
pub struct Cache {
    entries: BTreeMap<KeyName, Value>,
}

impl Cache {
    /// Create an empty cache
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Cached value of a key
    pub fn get(&self, name: &KeyName) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Cache a value, replacing (and dropping) the previous one
    pub fn insert(&mut self, name: KeyName, value: Value) {
        self.entries.insert(name, value);
    }

    /// Invalidate a key
    pub fn remove(&mut self, name: &KeyName) -> Option<Value> {
        self.entries.remove(name)
    }

    /// Invalidate everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Estimated heap bytes: map nodes plus owned strings
    pub fn heap_usage(&self) -> usize {
        self.entries
            .values()
            .map(|v| NODE_OVERHEAD + size_of::<KeyName>() + size_of::<Value>() + v.heap_usage())
            .sum()
    }
}
