//! Cache module
//!
//! A generic TTL cache with size-bounded eviction, instantiated once per
//! cached collection (filter-by-id, filter lists, group lists), plus a
//! registry that sweeps every instance from one background task.
//!
//! Entries are advisory copies of store-owned data: there is no write-back.
//! Mutations go to the store and then invalidate the affected keys.

pub mod key;
pub mod registry;

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

pub use key::CacheKey;
pub use registry::{CacheRegistry, ManagedCache, spawn_sweeper};

/// Point-in-time counters for one cache instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently held, including not-yet-swept expired ones
    pub size: usize,
    /// Entries that would still be served on a `get`
    pub valid_entries: usize,
}

struct CacheEntry<V> {
    data: V,
    stored_at: Instant,
}

/// Key-value cache with per-instance TTL and size bound
///
/// Entries expire `ttl` after insertion or refresh. `cleanup()` removes
/// expired entries and then evicts the oldest-stored entries down to
/// `max_size` (eviction is by insertion/refresh time, not last read).
///
/// All operations take the instance lock briefly and never perform I/O
/// under it; loaders run outside and insert their result afterwards, so
/// concurrent loads of a cold key may race rather than serialize.
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    max_size: usize,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(name: &'static str, ttl: Duration, max_size: usize) -> Self {
        Self {
            name,
            ttl,
            max_size,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get a value if present and not expired
    ///
    /// Expired entries are removed on access rather than waiting for the
    /// next sweep.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.data.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or refresh a value, resetting its age
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock();
        entries.insert(
            key,
            CacheEntry {
                data: value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Remove one key; returns whether it was present
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Remove expired entries, then evict the oldest entries until the
    /// cache is back at `max_size`. Returns the number of deletions.
    pub fn cleanup(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        let mut deleted = before - entries.len();

        if entries.len() > self.max_size {
            let excess = entries.len() - self.max_size;
            let mut by_age: Vec<(K, Instant)> = entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.stored_at))
                .collect();
            by_age.sort_by_key(|(_, stored_at)| *stored_at);
            for (key, _) in by_age.into_iter().take(excess) {
                entries.remove(&key);
                deleted += 1;
            }
        }

        deleted
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let valid_entries = entries
            .values()
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .count();
        CacheStats {
            size: entries.len(),
            valid_entries,
        }
    }
}
