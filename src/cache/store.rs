//! Cache Store Module
//!
//! Key/value storage owned by one cache actor: lazy TTL expiration and a
//! simple size bound.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::cache::{CacheCounters, CacheEntry, CacheStats};

// == Cache Store ==
/// Storage plus counters for a single cache instance.
///
/// Not synchronized; the owning actor serializes every access.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Running statistics
    counters: CacheCounters,
    /// Lifetime stamped onto every insert
    ttl: Option<Duration>,
    /// Maximum number of entries allowed
    max_size: Option<usize>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `ttl` - Lifetime of every inserted entry, None = never expire
    /// * `max_size` - Entry bound enforced after each insert, None = unbounded
    pub fn new(ttl: Option<Duration>, max_size: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            counters: CacheCounters::new(),
            ttl,
            max_size,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed here and counted as misses.
    pub fn get(&mut self, key: &K) -> Option<V> {
        self.lookup(key, Instant::now())
    }

    // == Get Many ==
    /// Looks up every key in one pass.
    ///
    /// Each key resolves to its cached value, else to its entry in `defaults`,
    /// else to None. Every key counts as its own hit or miss.
    /// A key listed twice is looked up twice.
    pub fn get_many(&mut self, keys: &[K], defaults: &HashMap<K, V>) -> HashMap<K, Option<V>> {
        let now = Instant::now();
        keys.iter()
            .map(|key| {
                let value = self
                    .lookup(key, now)
                    .or_else(|| defaults.get(key).cloned());
                (key.clone(), value)
            })
            .collect()
    }

    fn lookup(&mut self, key: &K, now: Instant) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => true,
            Some(entry) => {
                self.counters.record_hit();
                return Some(entry.value.clone());
            }
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        self.counters.record_miss();
        None
    }

    // == Put ==
    /// Stores a key-value pair, overwriting and re-stamping any existing entry.
    pub fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
        self.counters.record_puts(1);
        self.enforce_max_size();
    }

    // == Put Many ==
    /// Stores every pair, then applies the size bound once.
    pub fn put_many<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut count = 0;
        for (key, value) in entries {
            self.insert(key, value);
            count += 1;
        }
        self.counters.record_puts(count);
        self.enforce_max_size();
    }

    fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key, CacheEntry::new(value, self.ttl));
    }

    // == Invalidate ==
    /// Removes an entry. Returns whether anything was removed.
    pub fn invalidate(&mut self, key: &K) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.counters.record_invalidations(1);
        }
        removed
    }

    /// Removes every listed key. Returns the number removed.
    pub fn invalidate_many(&mut self, keys: &[K]) -> usize {
        let removed = keys
            .iter()
            .filter(|key| self.entries.remove(*key).is_some())
            .count();
        self.counters.record_invalidations(removed);
        removed
    }

    // == Clear ==
    /// Removes all entries. Returns the number removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.counters.record_invalidations(removed);
        removed
    }

    // == Enforce Max Size ==
    /// Drops entries until the store is back within its bound.
    ///
    /// Victims are taken from the front of the map's iteration order, which
    /// is arbitrary for a hash map. Returns the number evicted.
    fn enforce_max_size(&mut self) -> usize {
        let Some(max_size) = self.max_size else {
            return 0;
        };
        let excess = self.entries.len().saturating_sub(max_size);
        if excess == 0 {
            return 0;
        }

        let victims: Vec<K> = self.entries.keys().take(excess).cloned().collect();
        for key in &victims {
            self.entries.remove(key);
        }
        self.counters.record_evictions(excess);
        excess
    }

    pub fn record_warm_failure(&mut self) {
        self.counters.record_warm_failure();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len())
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included until read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks for a key without touching counters or expiry.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }
}
