//! Fixed-capacity least-recently-used cache

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::hash::Hash;

/// A bounded LRU map behind a single internal lock.
///
/// Entries are ordered oldest-first; a `get` refreshes the entry's recency
/// and an insert beyond capacity evicts the least recently used entry. The
/// lock is independent of every other lock in the engine.
pub struct BoundedCache<K, V> {
    inner: Mutex<CacheInner<K, V>>,
}

struct CacheInner<K, V> {
    map: IndexMap<K, V>,
    capacity: usize,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                map: IndexMap::with_capacity(capacity),
                capacity,
            }),
        }
    }

    /// Look up a key, refreshing its recency on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let index = inner.map.get_index_of(key)?;
        let last = inner.map.len() - 1;
        inner.map.move_index(index, last);
        inner.map.get(key).cloned()
    }

    /// Insert a value, evicting the least recently used entry if full.
    pub fn put(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        if inner.capacity == 0 {
            return;
        }
        inner.map.shift_remove(&key);
        if inner.map.len() >= inner.capacity {
            inner.map.shift_remove_index(0);
        }
        inner.map.insert(key, value);
    }

    /// Remove every entry the predicate selects.
    pub fn remove_if(&self, mut predicate: impl FnMut(&K, &V) -> bool) {
        let mut inner = self.inner.lock();
        inner.map.retain(|k, v| !predicate(k, v));
    }

    /// Change the capacity, evicting oldest entries as needed.
    pub fn resize(&self, capacity: usize) {
        let mut inner = self.inner.lock();
        inner.capacity = capacity;
        while inner.map.len() > capacity {
            inner.map.shift_remove_index(0);
        }
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().map.is_empty()
    }
}
