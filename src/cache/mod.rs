//! Cache Module
//!
//! Provides in-memory caching with per-namespace TTL expiration and
//! namespace-indexed invalidation.

mod entry;
mod namespace;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use namespace::{prefix_of, Namespace, TtlTable, NAMESPACE_SEPARATOR};
pub use stats::CacheStats;
pub use store::CacheStore;

/// Handle through which components share one store.
pub type SharedCache = Arc<RwLock<CacheStore>>;

/// Wraps a store into a shareable handle.
pub fn shared(store: CacheStore) -> SharedCache {
    Arc::new(RwLock::new(store))
}
