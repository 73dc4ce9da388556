//! LRU Store Module
//!
//! Byte-bounded key/value store with least-recently-used eviction.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::cache::{CacheStats, Store};

const NIL: usize = usize::MAX;

// == Recency Node ==
#[derive(Debug)]
struct Node {
    key: String,
    value: Bytes,
    prev: usize,
    next: usize,
}

impl Node {
    fn footprint(&self) -> usize {
        self.key.len() + self.value.len()
    }
}

// == Recency List ==
/// Doubly linked list stored in a slab.
///
/// - `head` = Most recently used
/// - `tail` = Least recently used
#[derive(Debug)]
struct Inner {
    nodes: Vec<Node>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: usize,
    tail: usize,
    size: usize,
    stats: CacheStats,
}

impl Inner {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
            size: 0,
            stats: CacheStats::new(),
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn promote(&mut self, idx: usize) {
        if self.head != idx {
            self.unlink(idx);
            self.push_front(idx);
        }
    }

    fn insert(&mut self, key: String, value: Bytes) {
        let node = Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        };
        self.size += node.footprint();
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.index.insert(key, idx);
        self.push_front(idx);
    }

    fn evict_oldest(&mut self) -> bool {
        let idx = self.tail;
        if idx == NIL {
            return false;
        }
        self.unlink(idx);
        let key = std::mem::take(&mut self.nodes[idx].key);
        let value = std::mem::take(&mut self.nodes[idx].value);
        self.index.remove(&key);
        self.size -= key.len() + value.len();
        self.free.push(idx);
        self.stats.record_eviction();
        true
    }
}

// == LRU Store ==
/// A byte-size-bounded store with strict LRU eviction.
///
/// The footprint of an entry is `key.len() + value.len()`. After every [`LruStore::set`] the
/// store evicts from the least recently used end until the total footprint fits the capacity.
#[derive(Debug)]
pub struct LruStore {
    capacity_bytes: usize,
    inner: Mutex<Inner>,
}

impl LruStore {
    // == Constructor ==
    /// Creates an empty store holding at most `capacity_bytes` of keys and values.
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            capacity_bytes,
            inner: Mutex::new(Inner::new()),
        }
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let mut inner = self.inner.lock();
        match inner.index.get(key).copied() {
            Some(idx) => {
                inner.promote(idx);
                inner.stats.record_hit();
                Some(inner.nodes[idx].value.clone())
            }
            None => {
                inner.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, then evicts until the store is within capacity.
    ///
    /// An empty value is never stored.
    pub fn set(&self, key: &str, value: Bytes) {
        if value.is_empty() {
            return;
        }

        let mut inner = self.inner.lock();
        if let Some(idx) = inner.index.get(key).copied() {
            let old_len = inner.nodes[idx].value.len();
            inner.size = inner.size + value.len() - old_len;
            inner.nodes[idx].value = value;
            inner.promote(idx);
        } else {
            inner.insert(key.to_owned(), value);
        }

        while inner.size > self.capacity_bytes {
            if !inner.evict_oldest() {
                break;
            }
        }
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.inner.lock().index.is_empty()
    }

    // == Size ==
    /// Returns the current footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.inner.lock().size
    }

    /// Returns the configured capacity in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    // == Stats ==
    /// Returns a snapshot of hit/miss/eviction counters and occupancy.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_occupancy(inner.index.len(), inner.size);
        stats
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn keys_by_recency(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut keys = Vec::with_capacity(inner.index.len());
        let mut idx = inner.head;
        while idx != NIL {
            keys.push(inner.nodes[idx].key.clone());
            idx = inner.nodes[idx].next;
        }
        keys
    }
}

impl Store for LruStore {
    fn get(&self, key: &str) -> Option<Bytes> {
        LruStore::get(self, key)
    }

    fn set(&self, key: &str, value: Bytes) {
        LruStore::set(self, key, value)
    }

    fn stats(&self) -> CacheStats {
        LruStore::stats(self)
    }
}
