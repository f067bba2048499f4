//! Generic TTL cache
//!
//! In-memory keyed store with per-entry expiry and a capacity-bounded
//! cleanup sweep. Expired data is never served silently; the orchestrator's
//! degraded path asks for it explicitly via [`TtlCache::get_stale`].

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Bound past which `set` sweeps expired entries
const DEFAULT_MAX_ENTRIES: usize = 64;

/// A stored value with its expiry policy
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Expired strictly after the TTL elapses; an age equal to the TTL
    /// still counts as fresh
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() > self.ttl
    }
}

/// Keyed value store with per-entry time-to-live.
///
/// A single mutex guards the map: operations are O(1) or O(n-expired)
/// and never block on I/O.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    max_entries: usize,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries,
        }
    }

    /// Store a value, overwriting any prior entry for the key. When the
    /// map has grown past `max_entries`, expired entries are swept as a
    /// side effect.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let mut entries = self.entries.lock();
        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );

        if entries.len() > self.max_entries {
            entries.retain(|_, entry| !entry.is_expired());
        }
    }

    /// Get the value for a key while it is unexpired. An expired entry is
    /// deleted on the way out (lazy eviction) and reported as absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Get the value for a key regardless of expiry, without evicting it.
    /// This is the degraded-mode read: old data beats no data.
    pub fn get_stale(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).map(|entry| entry.value.clone())
    }

    /// Whether an unexpired value exists for the key
    pub fn has(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let total = entries.len();
        let fresh = entries.values().filter(|e| !e.is_expired()).count();

        CacheStats {
            total,
            fresh,
            expired: total - fresh,
        }
    }
}

impl<K: Eq + Hash, V: Clone> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total: usize,
    pub fresh: usize,
    pub expired: usize,
}
