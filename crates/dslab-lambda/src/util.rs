//! Various utility structs.
use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

/// A simple incrementing counter.
#[derive(Default)]
pub struct Counter {
    value: u64,
}

impl Counter {
    /// Returns current counter value.
    pub fn curr(&self) -> u64 {
        self.value
    }

    /// Post-increments the counter.
    pub fn increment(&mut self) -> u64 {
        let curr = self.value;
        self.value += 1;
        curr
    }
}

/// IndexMap with faster hash function.
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
/// IndexSet with faster hash function.
pub type FxIndexSet<K> = IndexSet<K, BuildHasherDefault<FxHasher>>;
