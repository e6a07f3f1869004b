//! Cache Store Module
//!
//! Main cache engine: HashMap storage, namespace-derived TTLs and a
//! namespace -> keys index for exact bulk invalidation.

use std::collections::{HashMap, HashSet};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::namespace::prefix_of;
use crate::cache::{CacheEntry, CacheStats, Namespace, TtlTable};

// == Cache Store ==
/// In-memory TTL cache.
///
/// Operations never fail: an absent or expired key is reported as `None` and
/// the caller recomputes. There is no size-based eviction; cardinality is
/// bounded by the number of namespaces and identities in use.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Namespace prefix -> full keys stored under it
    index: HashMap<String, HashSet<String>>,
    /// TTL per namespace
    ttl: TtlTable,
    /// Invalidation count per namespace prefix
    generations: HashMap<String, u64>,
    /// Bumped by substring invalidation and clear, which span namespaces
    epoch: u64,
    /// Performance statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store using the given TTL table.
    pub fn new(ttl: TtlTable) -> Self {
        Self {
            entries: HashMap::new(),
            index: HashMap::new(),
            ttl,
            generations: HashMap::new(),
            epoch: 0,
            stats: CacheStats::new(),
        }
    }

    /// The TTL table this store was built with.
    pub fn ttl_table(&self) -> &TtlTable {
        &self.ttl
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry and resetting its age.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.set_at(key, value, current_timestamp_ms());
    }

    /// Same as [`set`](Self::set) with an explicit insertion time.
    pub fn set_at(&mut self, key: impl Into<String>, value: Value, now_ms: u64) {
        let key = key.into();

        self.index
            .entry(prefix_of(&key).to_string())
            .or_default()
            .insert(key.clone());
        self.entries.insert(key, CacheEntry::stored_at(value, now_ms));

        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the value for `key` if it is still within its namespace TTL.
    ///
    /// Stale entries count as misses but stay in place until the cleanup
    /// sweep, an invalidation or an overwrite removes them.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_at(key, current_timestamp_ms())
    }

    /// Same as [`get`](Self::get) evaluated at an explicit time.
    pub fn get_at(&mut self, key: &str, now_ms: u64) -> Option<Value> {
        let ttl = self.ttl.for_key(key);

        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(ttl, now_ms) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!(key, "cache entry expired");
                self.stats.record_miss();
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Typed Access ==
    /// Reads and deserializes a value. A payload of the wrong shape is a miss.
    pub fn get_json<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(key, error = %e, "cached payload has unexpected shape");
                None
            }
        }
    }

    /// Serializes and stores a value. Unserializable payloads are skipped.
    pub fn set_json<T: Serialize>(&mut self, key: impl Into<String>, value: &T) {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(json) => self.set(key, json),
            Err(e) => warn!(key = %key, error = %e, "payload not cacheable"),
        }
    }

    // == Generations ==
    /// Counter that moves forward whenever entries of `namespace` may have
    /// been invalidated.
    ///
    /// Read it before computing a value and hand it to
    /// [`set_json_if_generation`](Self::set_json_if_generation) so a result
    /// computed before an invalidation is never stored after it.
    pub fn generation(&self, namespace: Namespace) -> u64 {
        self.generation_of(namespace.as_str())
    }

    /// Stores `value` only if no invalidation touched the key's namespace
    /// since `generation` was read. Returns whether the value was stored.
    pub fn set_json_if_generation<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
        generation: u64,
    ) -> bool {
        let key = key.into();
        let current = self.generation_of(prefix_of(&key));
        if current != generation {
            debug!(key = %key, generation, current, "discarding value computed before invalidation");
            return false;
        }

        self.set_json(key, value);
        true
    }

    fn generation_of(&self, prefix: &str) -> u64 {
        self.epoch + self.generations.get(prefix).copied().unwrap_or(0)
    }

    fn bump_generation(&mut self, prefix: &str) {
        *self.generations.entry(prefix.to_string()).or_default() += 1;
    }

    // == Invalidate ==
    /// Removes every entry whose key contains `pattern`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, pattern: &str) -> usize {
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.contains(pattern))
            .cloned()
            .collect();

        for key in &doomed {
            self.remove_entry(key);
        }

        self.epoch += 1;
        self.finish_invalidation(pattern, doomed.len())
    }

    /// Removes every entry of `namespace` through the key index.
    pub fn invalidate_namespace(&mut self, namespace: Namespace) -> usize {
        let keys = self.index.remove(namespace.as_str()).unwrap_or_default();

        let removed = keys
            .iter()
            .filter(|key| self.entries.remove(key.as_str()).is_some())
            .count();

        self.bump_generation(namespace.as_str());
        self.finish_invalidation(namespace.as_str(), removed)
    }

    /// Removes a single key. Returns whether it was present.
    pub fn invalidate_key(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        self.bump_generation(prefix_of(key));
        self.finish_invalidation(key, usize::from(removed));
        removed
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.index.clear();
        self.epoch += 1;
        self.stats.record_invalidated(count);
        self.stats.set_total_entries(0);
    }

    // == Cleanup Expired ==
    /// Physically removes entries that are past their TTL.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(current_timestamp_ms())
    }

    pub fn cleanup_expired_at(&mut self, now_ms: u64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, entry)| entry.is_expired_at(self.ttl.for_key(key), now_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        self.stats.record_expired_removed(expired_keys.len());
        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }

        let prefix = prefix_of(key);
        if let Some(keys) = self.index.get_mut(prefix) {
            keys.remove(key);
            if keys.is_empty() {
                self.index.remove(prefix);
            }
        }
        true
    }

    fn finish_invalidation(&mut self, pattern: &str, removed: usize) -> usize {
        if removed > 0 {
            debug!(pattern, removed, "cache invalidated");
        }
        self.stats.record_invalidated(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(TtlTable::default())
    }
}
