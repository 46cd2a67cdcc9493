//! Cache for immutable index regions.

use std::{hash::Hash, num::NonZeroUsize};

use lru::LruCache;
use parking_lot::Mutex;

/// LRU table for entries that never change once written.
///
/// The lock is only ever held for the duration of a single map operation,
/// never across an await.
pub(crate) struct CacheTable<K, V> {
    cache: Mutex<LruCache<K, V>>,
}

impl<K: Hash + Eq, V: Clone> CacheTable<K, V> {
    pub(crate) fn new(size: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(size)),
        }
    }

    pub(crate) fn get(&self, k: &K) -> Option<V> {
        self.cache.lock().get(k).cloned()
    }

    pub(crate) fn insert(&self, k: K, v: V) {
        self.cache.lock().put(k, v);
    }

    pub(crate) fn len(&self) -> usize {
        self.cache.lock().len()
    }
}
