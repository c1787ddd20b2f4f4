//! Per-component memoization of expensive sub-calculations.

use std::collections::HashMap;
use std::hash::Hash;

/// Result cache scoped to one component instance.
///
/// Keys are request structs built from rounded numeric inputs so that
/// near-identical operating points hit the same entry. There is no eviction:
/// a simulation run is bounded in length and the cache dies with the
/// component.
#[derive(Debug, Clone)]
pub struct CalculationCache<K, V> {
    entries: HashMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash, V: Clone> CalculationCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached value for `key`, computing and storing it with
    /// `compute` on a miss.
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return value.clone();
        }
        self.misses += 1;
        let value = compute();
        self.entries.insert(key, value.clone());
        value
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to compute.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl<K: Eq + Hash, V: Clone> Default for CalculationCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lookup_hits() {
        let mut cache: CalculationCache<(i32, i32), f32> = CalculationCache::new();
        let mut calls = 0;
        let first = cache.get_or_insert_with((10, 20), || {
            calls += 1;
            1.5
        });
        let second = cache.get_or_insert_with((10, 20), || {
            calls += 1;
            9.9
        });
        assert_eq!(first, 1.5);
        assert_eq!(second, 1.5);
        assert_eq!(calls, 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn distinct_keys_compute_separately() {
        let mut cache: CalculationCache<i32, i32> = CalculationCache::new();
        cache.get_or_insert_with(1, || 10);
        cache.get_or_insert_with(2, || 20);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.misses(), 2);
    }
}
