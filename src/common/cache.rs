//! In-memory cache for storing key-value pairs.
//!
//! Uses moka's high-performance concurrent cache implementation.

use std::time::Duration;

use moka::sync::Cache;

/// Thread-safe in-memory cache with configurable capacity and lifetime.
///
/// Used for keeping fetched catalogs around so that a burst of activity
/// nodes built together shares one fetch.
#[derive(Clone)]
pub struct MemCache<K, V> {
    variables: Cache<K, V>,
}

impl<K, V> MemCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Allocate a new [`MemCache`] whose entries expire `ttl` after insertion.
    pub fn with_ttl(
        capacity: usize,
        ttl: Duration,
    ) -> Self {
        Self {
            variables: Cache::builder().max_capacity(capacity as u64).time_to_live(ttl).build(),
        }
    }

    /// Set a value.
    pub fn set(
        &self,
        key: K,
        value: V,
    ) {
        self.variables.insert(key, value);
    }

    /// Get a value through key `&K`.
    pub fn get(
        &self,
        key: &K,
    ) -> Option<V> {
        self.variables.get(key)
    }

    /// Remove a value through key `&K`.
    pub fn remove(
        &self,
        key: &K,
    ) {
        self.variables.remove(key);
    }
}
