//! LRU (Least Recently Used) cache implementation
//!
//! A key index (`HashMap` with AHash) maps every key to the slot of its entry
//! in the recency list, so lookups never scan and promotion, insertion and
//! eviction are all O(1).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::list::{Iter, RecencyList};

/// Upper bound on the slots reserved up front; larger caches grow on demand
const PREALLOC_LIMIT: usize = 1024;

/// LRU cache with fixed capacity
///
/// The cache holds at most `capacity` entries. Inserting a new key into a
/// full cache evicts the entry that was least recently touched by
/// [`get`](LruCache::get), [`get_mut`](LruCache::get_mut) or
/// [`set`](LruCache::set).
///
/// ```
/// use recency::LruCache;
///
/// let mut cache = LruCache::new(2).unwrap();
/// cache.set("a", 1);
/// cache.set("b", 2);
/// cache.get("a");
///
/// assert_eq!(cache.set("c", 3), Some(("b", 2)));
/// assert_eq!(cache.debug_dump(), vec![&"c", &"a"]);
/// ```
pub struct LruCache<K, V> {
    index: HashMap<K, usize, RandomState>,
    list: RecencyList<K, V>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, must be a positive integer
    ///
    /// # Returns
    /// * `Result<LruCache>` - `Error::InvalidArgument` if `capacity` is zero,
    ///   negative or does not fit in a `usize`
    pub fn new<C>(capacity: C) -> Result<Self>
    where
        C: TryInto<usize> + Copy + fmt::Display,
    {
        let capacity = match capacity.try_into() {
            Ok(capacity) if capacity > 0 => capacity,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "capacity must be a positive integer, got {}",
                    capacity
                )))
            }
        };

        let reserved = capacity.min(PREALLOC_LIMIT);
        debug!(capacity, "creating LRU cache");

        Ok(Self {
            index: HashMap::with_capacity_and_hasher(reserved, RandomState::new()),
            list: RecencyList::with_capacity(reserved),
            capacity,
        })
    }

    /// Get a value and mark it as most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.promote(key)?;
        self.list.entry(idx).map(|entry| &entry.value)
    }

    /// Get a mutable reference to a value and mark it as most recently used
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.promote(key)?;
        self.list.entry_mut(idx).map(|entry| &mut entry.value)
    }

    /// Insert or update a key-value pair and mark it as most recently used
    ///
    /// # Returns
    /// * `Some((key, value))` - the entry evicted to make room, if any
    /// * `None` - the key was updated in place or the cache had room
    pub fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.list.entry_mut(idx) {
                entry.value = value;
            }
            self.list.move_to_front(idx);
            return None;
        }

        let idx = self.list.push_front(key.clone(), value);
        self.index.insert(key, idx);

        if self.list.len() > self.capacity {
            self.evict()
        } else {
            None
        }
    }

    /// Look up a value without touching recency order
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.list.entry(idx).map(|entry| &entry.value)
    }

    /// Check whether a key is cached without touching recency order
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Remove a key from the cache
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        self.list.remove(idx).map(|(_, value)| value)
    }

    /// Remove and return the least recently used entry
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (key, value) = self.list.pop_back()?;
        self.index.remove(&key);
        Some((key, value))
    }

    /// The least recently used entry, i.e. the next one to be evicted
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let entry = self.list.entry(self.list.tail()?)?;
        Some((&entry.key, &entry.value))
    }

    /// Keys in recency order, most recently used first
    pub fn debug_dump(&self) -> Vec<&K> {
        self.list.iter().map(|(key, _)| key).collect()
    }

    fn promote<Q>(&mut self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.list.move_to_front(idx);
        Some(idx)
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let evicted = self.pop_lru()?;
        trace!(capacity = self.capacity, len = self.list.len(), "evicted LRU entry");
        Some(evicted)
    }

    /// Panic unless the index and the recency list describe the same entries.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let order = self.list.check_links();
        assert_eq!(self.index.len(), self.list.len(), "index and list sizes differ");
        assert!(self.list.len() <= self.capacity, "cache exceeds its capacity");
        for idx in order {
            let entry = self.list.entry(idx).expect("live slot");
            assert_eq!(self.index.get(&entry.key), Some(&idx), "index points at the wrong slot");
        }
    }
}

impl<K, V> LruCache<K, V> {
    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.list.len() == 0
    }

    /// Maximum number of entries, fixed at construction
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry; capacity is unchanged
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    /// Iterate from most to least recently used without promoting anything
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.list.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a LruCache<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LruCache contents:")?;
        for (key, value) in self.iter() {
            writeln!(f, "\tkey: {}; value: {}", key, value)?;
        }
        Ok(())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
