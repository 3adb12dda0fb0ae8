//! # recency
//!
//! Fixed-capacity LRU (least recently used) key/value cache.
//!
//! ## Architecture
//! - **Recency list**: arena-backed doubly-linked list, head = most recently used (O(1))
//! - **Key index**: AHash map from key to list slot (O(1))
//! - **LruCache**: single-owner façade composing both
//! - **SyncLruCache**: one `LruCache` behind a `parking_lot` mutex
//! - **ShardedLruCache**: key space split over independently locked shards
//!
//! ```
//! use recency::LruCache;
//!
//! let mut cache = LruCache::new(3).unwrap();
//! cache.set(1, "one");
//! cache.set(2, "two");
//! cache.set(3, "three");
//! assert_eq!(cache.get(&1), Some(&"one"));
//!
//! // 2 is now the least recently used entry
//! assert_eq!(cache.set(4, "four"), Some((2, "two")));
//! assert_eq!(cache.debug_dump(), vec![&4, &1, &3]);
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod list;
mod lru;
mod shard;
mod stats;

pub use cache::SyncLruCache;
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use list::Iter;
pub use lru::LruCache;
pub use shard::ShardedLruCache;
pub use stats::{CacheStats, StatsSnapshot};
