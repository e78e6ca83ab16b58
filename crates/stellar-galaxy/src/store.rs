//! Keyed storage with dense, recycled integer slots for O(1) random sampling.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::hash::Hash;

use rand::Rng;
use rustc_hash::FxHashMap;

/// Errors returned by [`IndexedStore`] lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No entry currently holds this slot.
    #[error("no entry is assigned to index {0}")]
    UnassignedIndex(usize),
}

/// A map that also gives every entry a dense integer slot.
///
/// Three mappings are kept in lockstep: key → value, slot → key and
/// key → slot. Slots freed by [`remove`](Self::remove) are reused smallest
/// first, so the slot range stays as compact as the removal history allows
/// and [`get_random`](Self::get_random) stays uniform over held entries.
#[derive(Debug, Clone)]
pub struct IndexedStore<K, V> {
    values: FxHashMap<K, V>,
    index_to_key: FxHashMap<usize, K>,
    key_to_index: FxHashMap<K, usize>,
    free: BinaryHeap<Reverse<usize>>,
    /// One past the highest slot ever handed out.
    next_index: usize,
}

impl<K, V> Default for IndexedStore<K, V> {
    fn default() -> Self {
        Self {
            values: FxHashMap::default(),
            index_to_key: FxHashMap::default(),
            key_to_index: FxHashMap::default(),
            free: BinaryHeap::new(),
            next_index: 0,
        }
    }
}

impl<K: Clone + Eq + Hash, V> IndexedStore<K, V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `key`.
    ///
    /// A new key receives the smallest freed slot, else the next sequential
    /// one. Replacing an existing key keeps its slot and returns the old value.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        if let Some(old) = self.values.get_mut(&key) {
            return Some(std::mem::replace(old, value));
        }

        let index = self.take_free_index();
        self.index_to_key.insert(index, key.clone());
        self.key_to_index.insert(key.clone(), index);
        self.values.insert(key, value);
        None
    }

    /// Remove `key`, returning its value and releasing its slot.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.values.remove(key)?;
        if let Some(index) = self.key_to_index.remove(key) {
            self.index_to_key.remove(&index);
            self.free.push(Reverse(index));
        }
        Some(value)
    }

    /// Value stored under `key`.
    pub fn get_by_key(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    /// Mutable value stored under `key`.
    pub fn get_by_key_mut(&mut self, key: &K) -> Option<&mut V> {
        self.values.get_mut(key)
    }

    /// Value held in slot `index`.
    pub fn get_by_index(&self, index: usize) -> Result<&V, StoreError> {
        self.index_to_key
            .get(&index)
            .and_then(|key| self.values.get(key))
            .ok_or(StoreError::UnassignedIndex(index))
    }

    /// Slot currently assigned to `key`.
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.key_to_index.get(key).copied()
    }

    /// Uniformly random entry using the thread-local RNG.
    pub fn get_random(&self) -> Option<&V> {
        self.get_random_with(&mut rand::rng())
    }

    /// Uniformly random entry drawn with `rng`.
    ///
    /// With no freed slots outstanding the slot range is exactly
    /// `[0, len)` and a single draw suffices. Otherwise draws that land on a
    /// freed slot are rejected and redrawn, which keeps the distribution
    /// uniform over held entries.
    pub fn get_random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&V> {
        if self.values.is_empty() {
            return None;
        }
        loop {
            let index = rng.random_range(0..self.next_index);
            if let Ok(value) = self.get_by_index(index) {
                return Some(value);
            }
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn has_key(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Returns `true` if slot `index` is assigned.
    pub fn has_index(&self, index: usize) -> bool {
        self.index_to_key.contains_key(&index)
    }

    /// Remove everything and reset slot numbering.
    pub fn clear(&mut self) {
        self.values.clear();
        self.index_to_key.clear();
        self.key_to_index.clear();
        self.free.clear();
        self.next_index = 0;
    }

    /// Keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.values.keys()
    }

    /// Values in unspecified order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.values.values()
    }

    /// Key/value pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.values.iter()
    }

    fn take_free_index(&mut self) -> usize {
        match self.free.pop() {
            Some(Reverse(index)) => index,
            None => {
                let index = self.next_index;
                self.next_index += 1;
                index
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn store_of(n: u32) -> IndexedStore<String, u32> {
        let mut store = IndexedStore::new();
        for i in 0..n {
            store.set(format!("key{i}"), i);
        }
        store
    }

    #[test]
    fn test_set_assigns_sequential_indices() {
        let store = store_of(3);
        assert_eq!(store.index_of(&"key0".to_string()), Some(0));
        assert_eq!(store.index_of(&"key2".to_string()), Some(2));
        assert_eq!(store.get_by_index(1), Ok(&1));
    }

    #[test]
    fn test_remove_then_insert_reuses_index() {
        let mut store = store_of(5);
        assert_eq!(store.remove(&"key2".to_string()), Some(2));
        assert_eq!(store.len(), 4);
        assert!(!store.has_index(2));
        assert_eq!(store.get_by_index(2), Err(StoreError::UnassignedIndex(2)));

        store.set("fresh".to_string(), 99);
        assert_eq!(store.index_of(&"fresh".to_string()), Some(2));
        assert_eq!(store.get_by_index(2), Ok(&99));
    }

    #[test]
    fn test_smallest_freed_index_reused_first() {
        let mut store = store_of(6);
        store.remove(&"key4".to_string());
        store.remove(&"key1".to_string());
        store.remove(&"key3".to_string());

        store.set("a".to_string(), 0);
        store.set("b".to_string(), 0);
        store.set("c".to_string(), 0);
        store.set("d".to_string(), 0);
        assert_eq!(store.index_of(&"a".to_string()), Some(1));
        assert_eq!(store.index_of(&"b".to_string()), Some(3));
        assert_eq!(store.index_of(&"c".to_string()), Some(4));
        assert_eq!(store.index_of(&"d".to_string()), Some(6));
    }

    #[test]
    fn test_replacing_key_keeps_index() {
        let mut store = store_of(3);
        assert_eq!(store.set("key1".to_string(), 10), Some(1));
        assert_eq!(store.len(), 3);
        assert_eq!(store.index_of(&"key1".to_string()), Some(1));
        assert_eq!(store.get_by_key(&"key1".to_string()), Some(&10));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut store = store_of(2);
        assert_eq!(store.remove(&"nope".to_string()), None);
        store.set("x".to_string(), 5);
        assert_eq!(store.index_of(&"x".to_string()), Some(2));
    }

    #[test]
    fn test_get_random_empty_is_none() {
        let store: IndexedStore<u32, u32> = IndexedStore::new();
        assert!(store.get_random().is_none());
    }

    #[test]
    fn test_get_random_is_uniform() {
        let store = store_of(5);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut counts = [0u32; 5];
        let trials = 50_000;
        for _ in 0..trials {
            let v = store.get_random_with(&mut rng).unwrap();
            counts[*v as usize] += 1;
        }
        let expected = trials as f64 / 5.0;
        for count in counts {
            assert!(
                (count as f64 - expected).abs() < expected * 0.05,
                "count {count} too far from {expected}"
            );
        }
    }

    #[test]
    fn test_get_random_never_returns_removed() {
        let mut store = store_of(4);
        store.remove(&"key0".to_string());
        store.remove(&"key3".to_string());
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..1_000 {
            let v = *store.get_random_with(&mut rng).unwrap();
            assert!(v == 1 || v == 2);
        }
    }

    #[test]
    fn test_clear_resets_numbering() {
        let mut store = store_of(4);
        store.remove(&"key1".to_string());
        store.clear();
        assert!(store.is_empty());
        store.set("again".to_string(), 1);
        assert_eq!(store.index_of(&"again".to_string()), Some(0));
    }

    #[test]
    fn test_iteration_matches_contents() {
        let store = store_of(4);
        let mut keys: Vec<_> = store.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["key0", "key1", "key2", "key3"]);
        assert_eq!(store.values().sum::<u32>(), 6);
        assert_eq!(store.iter().count(), 4);
        assert!(store.has_key(&"key3".to_string()));
    }
}
