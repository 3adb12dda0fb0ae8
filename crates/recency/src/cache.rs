//! SyncLruCache: LRU cache shared between threads behind a single lock

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::lru::LruCache;
use crate::stats::CacheStats;

/// Thread-safe handle to one [`LruCache`]
///
/// Every operation holds the mutex for its whole duration, since a lookup
/// mutates the recency links just like an insert does. Cloning the handle
/// shares the same cache and statistics.
pub struct SyncLruCache<K, V> {
    /// LRU cache guarded by one lock
    cache: Arc<Mutex<LruCache<K, V>>>,

    /// Cache statistics
    stats: Arc<CacheStats>,

    /// Cache capacity
    capacity: usize,
}

impl<K, V> SyncLruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a new shared cache with the given capacity
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of items in cache
    ///
    /// # Returns
    /// * `Result<SyncLruCache>` - `Error::InvalidArgument` for a non-positive capacity
    pub fn new<C>(capacity: C) -> Result<Self>
    where
        C: TryInto<usize> + Copy + fmt::Display,
    {
        let cache = LruCache::new(capacity)?;
        let capacity = cache.capacity();

        Ok(Self {
            cache: Arc::new(Mutex::new(cache)),
            stats: Arc::new(CacheStats::new()),
            capacity,
        })
    }

    /// Get a copy of a value and mark it as most recently used
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut cache = self.cache.lock();
        let value = cache.get(key).cloned();
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    /// Insert or update a value
    ///
    /// # Returns
    /// * `Option<(K, V)>` - the entry evicted to make room, if any
    pub fn set(&self, key: K, value: V) -> Option<(K, V)> {
        // Counters move under the lock so `clear` resets them atomically
        let mut cache = self.cache.lock();
        let existed = cache.contains(&key);
        let evicted = cache.set(key, value);

        if existed {
            self.stats.record_update();
        } else {
            self.stats.record_insert();
        }
        if evicted.is_some() {
            self.stats.record_eviction();
        }
        evicted
    }

    /// Get a copy of a value without touching recency order
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.lock().peek(key).cloned()
    }

    /// Check whether a key is cached
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.lock().contains(key)
    }

    /// Remove a value from the cache
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.lock().remove(key)
    }

    /// Keys in recency order, most recently used first
    pub fn debug_dump(&self) -> Vec<K> {
        self.cache.lock().debug_dump().into_iter().cloned().collect()
    }

    /// Run several operations under one lock acquisition
    ///
    /// Statistics are not recorded for work done inside the closure.
    pub fn with_lock<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut LruCache<K, V>) -> R,
    {
        let mut cache = self.cache.lock();
        f(&mut *cache)
    }
}

impl<K, V> SyncLruCache<K, V> {
    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get current cache size
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
        self.stats.reset();
    }
}

impl<K, V> Clone for SyncLruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            stats: Arc::clone(&self.stats),
            capacity: self.capacity,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SyncLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncLruCache")
            .field("capacity", &self.capacity)
            .field("entries", &*self.cache.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::thread;

    #[test]
    fn test_cache_basic() {
        let cache = SyncLruCache::new(10).unwrap();

        cache.set(1u64, b"test data".to_vec());
        let data = cache.get(&1).unwrap();

        assert_eq!(data, b"test data");
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 0);
        assert_eq!(cache.stats().inserts(), 1);
    }

    #[test]
    fn test_invalid_capacity() {
        let result = SyncLruCache::<u64, u64>::new(0);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_cache_miss() {
        let cache: SyncLruCache<u64, String> = SyncLruCache::new(2).unwrap();

        assert_eq!(cache.get(&7), None);
        assert_eq!(cache.stats().misses(), 1);
        assert_eq!(cache.stats().hit_ratio(), 0.0);
    }

    #[test]
    fn test_cache_eviction() {
        let cache = SyncLruCache::new(2).unwrap();

        cache.set(0, "data 0");
        cache.set(1, "data 1");
        assert_eq!(cache.len(), 2);

        // Cache should evict 0 (LRU), now: [2 (head), 1]
        assert_eq!(cache.set(2, "data 2"), Some((0, "data 0")));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.debug_dump(), vec![2, 1]);

        assert_eq!(cache.get(&1), Some("data 1"));
        assert_eq!(cache.get(&2), Some("data 2"));
        assert_eq!(cache.get(&0), None);

        let stats = cache.stats().snapshot();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
    }

    #[test]
    fn test_cache_update_counted() {
        let cache = SyncLruCache::new(2).unwrap();

        cache.set("k", 1);
        cache.set("k", 2);

        assert_eq!(cache.peek("k"), Some(2));
        assert_eq!(cache.stats().inserts(), 1);
        assert_eq!(cache.stats().updates(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_remove() {
        let cache = SyncLruCache::new(10).unwrap();

        cache.set("k", 1);
        assert!(cache.contains("k"));
        assert_eq!(cache.remove("k"), Some(1));
        assert!(!cache.contains("k"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_clear() {
        let cache = SyncLruCache::new(10).unwrap();

        cache.set(0, 0);
        cache.set(1, 1);
        cache.get(&0);
        assert_eq!(cache.len(), 2);

        cache.clear();

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().hits(), 0);
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn test_with_lock_compound() {
        let cache = SyncLruCache::new(3).unwrap();
        cache.set(1, 10);

        let bumped = cache.with_lock(|lru| {
            let next = lru.peek(&1).copied().unwrap_or(0) + 1;
            lru.set(1, next);
            next
        });

        assert_eq!(bumped, 11);
        assert_eq!(cache.get(&1), Some(11));
    }

    #[test]
    fn test_clones_share_state() {
        let cache = SyncLruCache::new(4).unwrap();
        let other = cache.clone();

        other.set(1, 1);
        assert_eq!(cache.get(&1), Some(1));
        assert_eq!(other.stats().hits(), 1);
    }

    #[test]
    fn test_concurrent_access_respects_capacity() {
        let cache = SyncLruCache::new(16).unwrap();

        thread::scope(|scope| {
            for t in 0..4u64 {
                let cache = cache.clone();
                scope.spawn(move || {
                    for i in 0..500u64 {
                        let key = (t * 1000 + i) % 64;
                        cache.set(key, i);
                        cache.get(&key);
                    }
                });
            }
        });

        assert_eq!(cache.len(), 16);
        cache.with_lock(|lru| lru.check_invariants());

        let stats = cache.stats().snapshot();
        assert_eq!(stats.inserts + stats.updates, 2000);
        assert_eq!(stats.hits + stats.misses, 2000);
        assert_eq!(stats.inserts - stats.evictions, 16);
    }

    #[test]
    fn test_clear_resets_stats_consistently() {
        let cache = SyncLruCache::new(8).unwrap();

        thread::scope(|scope| {
            for t in 0..4u64 {
                let cache = cache.clone();
                scope.spawn(move || {
                    for i in 0..2000u64 {
                        cache.set((t * 31 + i) % 32, i);
                        cache.get(&(i % 32));
                    }
                });
            }

            for _ in 0..200 {
                cache.clear();
                cache.with_lock(|lru| {
                    let stats = cache.stats().snapshot();
                    assert_eq!(stats.inserts - stats.evictions, lru.len() as u64);
                });
            }
        });
    }
}
