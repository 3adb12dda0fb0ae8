//! Cache configuration

use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::SyncLruCache;
use crate::error::{Error, Result};
use crate::shard::ShardedLruCache;

fn default_shards() -> usize {
    1
}

/// Settings for building a concurrent cache
///
/// ```
/// use recency::CacheConfig;
///
/// let config = CacheConfig::from_json(r#"{ "capacity": 1000, "shards": 8 }"#).unwrap();
/// let cache = config.build_sharded::<String, Vec<u8>>().unwrap();
/// assert_eq!(cache.shard_count(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of entries (number of items, not bytes)
    pub capacity: usize,

    /// Number of independently locked shards
    #[serde(default = "default_shards")]
    pub shards: usize,
}

impl CacheConfig {
    /// Single-shard configuration with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            shards: default_shards(),
        }
    }

    /// Set the shard count
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CacheConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that capacity and shard count are usable
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidArgument(
                "capacity must be a positive integer, got 0".to_string(),
            ));
        }
        if self.shards == 0 || self.shards > self.capacity {
            return Err(Error::InvalidArgument(format!(
                "shard count must be between 1 and capacity ({}), got {}",
                self.capacity, self.shards
            )));
        }
        Ok(())
    }

    /// Build a single-lock cache; the shard count must be 1
    pub fn build_sync<K, V>(&self) -> Result<SyncLruCache<K, V>>
    where
        K: Hash + Eq + Clone,
        V: Clone,
    {
        self.validate()?;
        if self.shards != 1 {
            return Err(Error::InvalidArgument(format!(
                "single-lock cache needs exactly 1 shard, got {}",
                self.shards
            )));
        }
        debug!(capacity = self.capacity, "building single-lock cache from config");
        SyncLruCache::new(self.capacity)
    }

    /// Build a sharded cache
    pub fn build_sharded<K, V>(&self) -> Result<ShardedLruCache<K, V>>
    where
        K: Hash + Eq + Clone,
        V: Clone,
    {
        self.validate()?;
        debug!(
            capacity = self.capacity,
            shards = self.shards,
            "building sharded cache from config"
        );
        ShardedLruCache::new(self.capacity, self.shards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_defaults_to_one_shard() {
        let config = CacheConfig::from_json(r#"{ "capacity": 3 }"#).unwrap();
        assert_eq!(config, CacheConfig::new(3));
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            CacheConfig::from_json(r#"{ "capacity": 0 }"#),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            CacheConfig::from_json(r#"{ "capacity": 2, "shards": 3 }"#),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            CacheConfig::from_json(r#"{ "capacity": -1 }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            CacheConfig::from_json(r#"{ "capacity": 4, "ttl": 10 }"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = CacheConfig::new(128).with_shards(4);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(CacheConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_build_sync() {
        let cache = CacheConfig::new(2).build_sync().unwrap();
        cache.set(1, 1);
        cache.set(2, 2);
        cache.set(3, 3);

        assert_eq!(cache.capacity(), 2);
        assert_eq!(cache.debug_dump(), vec![3, 2]);
    }

    #[test]
    fn test_build_sync_rejects_shards() {
        let result = CacheConfig::new(8).with_shards(2).build_sync::<u32, u32>();
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_build_sharded() {
        let cache = CacheConfig::new(32).with_shards(4).build_sharded().unwrap();
        cache.set("key".to_string(), 1);

        assert_eq!(cache.get("key"), Some(1));
        assert_eq!(cache.capacity(), 32);
        assert_eq!(cache.shard_count(), 4);
    }
}
