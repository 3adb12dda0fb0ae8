//! Recency list: arena-backed doubly-linked list of cache entries
//!
//! Entries live in a `Vec<Option<Entry>>` and link to each other by slot
//! index, so unlinking a known entry and relinking it at the head are both
//! O(1). Freed slots are recycled through a free list, which keeps every
//! live index stable for as long as its entry exists.

use std::iter::FusedIterator;

/// One cached key/value pair and its position in recency order
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Neighbour closer to the head
    newer: Option<usize>,
    /// Neighbour closer to the tail
    older: Option<usize>,
}

/// Entries ordered from most recently used (head) to least recently used (tail)
pub(crate) struct RecencyList<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub(crate) fn entry(&self, idx: usize) -> Option<&Entry<K, V>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub(crate) fn entry_mut(&mut self, idx: usize) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Insert a new entry at the head and return its slot index
    pub(crate) fn push_front(&mut self, key: K, value: V) -> usize {
        let idx = self.alloc_slot(Entry {
            key,
            value,
            newer: None,
            older: self.head,
        });

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.slots[head_idx] {
                head.newer = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.len += 1;

        idx
    }

    /// Relink an entry at the head
    pub(crate) fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);

        let old_head = self.head;
        if let Some(entry) = &mut self.slots[idx] {
            entry.newer = None;
            entry.older = old_head;
        }

        match old_head {
            Some(head_idx) => {
                if let Some(head) = &mut self.slots[head_idx] {
                    head.newer = Some(idx);
                }
            }
            // The list held only this entry
            None => self.tail = Some(idx),
        }

        self.head = Some(idx);
    }

    /// Unlink an entry and release its slot
    pub(crate) fn remove(&mut self, idx: usize) -> Option<(K, V)> {
        self.entry(idx)?;
        self.unlink(idx);
        let entry = self.slots[idx].take()?;
        self.free_list.push(idx);
        self.len -= 1;
        Some((entry.key, entry.value))
    }

    /// Remove the least recently used entry
    pub(crate) fn pop_back(&mut self) -> Option<(K, V)> {
        let tail_idx = self.tail?;
        self.remove(tail_idx)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (newer, older) = match &self.slots[idx] {
            Some(entry) => (entry.newer, entry.older),
            None => return,
        };

        match newer {
            Some(newer_idx) => {
                if let Some(newer_entry) = &mut self.slots[newer_idx] {
                    newer_entry.older = older;
                }
            }
            None => self.head = older,
        }

        match older {
            Some(older_idx) => {
                if let Some(older_entry) = &mut self.slots[older_idx] {
                    older_entry.newer = newer;
                }
            }
            None => self.tail = newer,
        }

        if let Some(entry) = &mut self.slots[idx] {
            entry.newer = None;
            entry.older = None;
        }
    }

    fn alloc_slot(&mut self, entry: Entry<K, V>) -> usize {
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(entry);
            idx
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        }
    }

    /// Walk the chain from head to tail and panic on any broken link.
    ///
    /// Returns the slot indices from head to tail.
    #[cfg(test)]
    pub(crate) fn check_links(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len);
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let entry = self.entry(idx).expect("link points at a free slot");
            assert_eq!(entry.newer, prev, "newer link of slot {} is wrong", idx);
            assert!(order.len() < self.len, "cycle or stray entry in recency list");
            order.push(idx);
            prev = Some(idx);
            cursor = entry.older;
        }
        assert_eq!(prev, self.tail, "walk from head does not end at tail");
        assert_eq!(order.len(), self.len);

        let live = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(live, self.len, "unreachable live slots");
        assert_eq!(self.slots.len(), live + self.free_list.len());

        order
    }
}

/// Iterator over entries from most to least recently used
pub struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.list.entry(self.front?)?;
        self.front = entry.older;
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.list.entry(self.back?)?;
        self.back = entry.newer;
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            list: self.list,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}
