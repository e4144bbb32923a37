//! Cache Store Module
//!
//! Main cache engine: HashMap storage of JSON payloads with TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats};

// == Cache Store ==
/// In-memory cache with per-entry TTL.
///
/// Expiry is checked on every read, so an expired entry is never served even
/// if the background cleanup task has not visited it yet. There is no size
/// bound and no eviction besides TTL.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Default TTL in seconds for entries without explicit TTL
    default_ttl: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given default TTL in seconds.
    pub fn new(default_ttl: u64) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a serializable value with optional TTL in seconds.
    ///
    /// If the key already exists, the value is overwritten and TTL is reset.
    /// A zero or missing TTL falls back to the store default.
    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
        ttl: Option<u64>,
    ) -> serde_json::Result<()> {
        let payload = serde_json::to_value(value)?;
        let ttl_secs = ttl.filter(|t| *t > 0).unwrap_or(self.default_ttl);

        self.entries.insert(
            key.into(),
            CacheEntry::new(payload, Duration::from_secs(ttl_secs)),
        );
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key, deserialized into `T`.
    ///
    /// Returns None if the key is missing, expired, or holds a payload of a
    /// different shape. Expired entries are removed as a side effect.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        if !self.has(key) {
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get(key)?;
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => {
                self.stats.record_hit();
                Some(value)
            }
            Err(err) => {
                debug!(key, error = %err, "Cached payload has unexpected shape");
                self.stats.record_miss();
                None
            }
        }
    }

    // == Has ==
    /// Returns true if a live entry exists for `key`.
    ///
    /// Same expiry semantics as [`CacheStore::get`].
    pub fn has(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            return false;
        }

        true
    }

    // == Delete ==
    /// Removes an entry by key. Returns true if an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());

        let count = before - self.entries.len();
        self.stats.record_expirations(count);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    /// Returns the current number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
