//! Cache Entry Module
//!
//! Defines the structure for individual cache entries. Entries carry no TTL of
//! their own; the store resolves it from the key's namespace.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with its insertion timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Insertion timestamp (Unix milliseconds)
    pub stored_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with an explicit time.
    pub fn stored_at(value: Value, stored_at: u64) -> Self {
        Self { value, stored_at }
    }

    // == Age ==
    /// Milliseconds elapsed between insertion and `now_ms`.
    ///
    /// A clock that moved backwards yields an age of zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.stored_at)
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl` at `now_ms`.
    ///
    /// Boundary condition: the entry is valid only while `age < ttl`, so an
    /// entry whose age equals the TTL is already expired.
    pub fn is_expired_at(&self, ttl: Duration, now_ms: u64) -> bool {
        u128::from(self.age_ms(now_ms)) >= ttl.as_millis()
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
