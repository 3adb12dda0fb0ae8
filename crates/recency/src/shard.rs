//! Sharded LRU cache
//!
//! Splits the key space over independent [`SyncLruCache`] shards so threads
//! touching different shards never contend on the same lock. Recency order
//! and eviction are exact within a shard and only approximate across the
//! whole cache.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};

use ahash::RandomState;
use tracing::{debug, trace};

use crate::cache::SyncLruCache;
use crate::error::{Error, Result};
use crate::stats::StatsSnapshot;

/// Thread-safe LRU cache partitioned by key hash
pub struct ShardedLruCache<K, V> {
    shards: Vec<SyncLruCache<K, V>>,
    hasher: RandomState,
    capacity: usize,
}

impl<K, V> ShardedLruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache holding `capacity` entries spread over `shards` shards
    ///
    /// Shard capacities differ by at most one and add up to `capacity`.
    ///
    /// # Returns
    /// * `Result<ShardedLruCache>` - `Error::InvalidArgument` if `capacity`
    ///   or `shards` is zero, or there are more shards than entries
    pub fn new(capacity: usize, shards: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument(
                "capacity must be a positive integer, got 0".to_string(),
            ));
        }
        if shards == 0 || shards > capacity {
            return Err(Error::InvalidArgument(format!(
                "shard count must be between 1 and capacity ({}), got {}",
                capacity, shards
            )));
        }

        let base = capacity / shards;
        let extra = capacity % shards;
        let shards = (0..shards)
            .map(|i| SyncLruCache::new(if i < extra { base + 1 } else { base }))
            .collect::<Result<Vec<_>>>()?;

        debug!(capacity, shards = shards.len(), "creating sharded LRU cache");

        Ok(Self {
            shards,
            hasher: RandomState::new(),
            capacity,
        })
    }

    /// Get a copy of a value and mark it as most recently used in its shard
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).get(key)
    }

    /// Insert or update a value
    ///
    /// # Returns
    /// * `Option<(K, V)>` - the entry evicted from the key's shard, if any
    pub fn set(&self, key: K, value: V) -> Option<(K, V)> {
        self.shard(&key).set(key, value)
    }

    /// Check whether a key is cached
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).contains(key)
    }

    /// Remove a value from the cache
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).remove(key)
    }

    fn shard<Q>(&self, key: &Q) -> &SyncLruCache<K, V>
    where
        Q: Hash + ?Sized,
    {
        let idx = (BuildHasher::hash_one(&self.hasher, key) % self.shards.len() as u64) as usize;
        trace!(shard = idx, "selected shard");
        &self.shards[idx]
    }
}

impl<K, V> ShardedLruCache<K, V> {
    /// Total number of cached entries across all shards
    pub fn len(&self) -> usize {
        self.shards.iter().map(SyncLruCache::len).sum()
    }

    /// Check if every shard is empty
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(SyncLruCache::is_empty)
    }

    /// Total capacity across all shards
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of shards
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Drop every entry and reset statistics in all shards
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.clear();
        }
    }

    /// Statistics summed over all shards
    pub fn stats(&self) -> StatsSnapshot {
        self.shards.iter().map(|shard| shard.stats().snapshot()).sum()
    }
}
