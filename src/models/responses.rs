//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::{ContentItem, Profile};

/// Response body for approve/reject
#[derive(Debug, Clone, Serialize)]
pub struct ContentActionResponse {
    pub message: String,
    pub item: ContentItem,
}

impl ContentActionResponse {
    pub fn new(item: ContentItem) -> Self {
        Self {
            message: format!("{} '{}' is now {}", item.kind, item.id, item.status),
            item,
        }
    }
}

/// Response body for ban/unban/role change
#[derive(Debug, Clone, Serialize)]
pub struct UserActionResponse {
    pub message: String,
    pub profile: Profile,
}

impl UserActionResponse {
    pub fn new(message: impl Into<String>, profile: Profile) -> Self {
        Self {
            message: message.into(),
            profile,
        }
    }
}

/// Response body for the cache stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub invalidated: u64,
    pub expired_removed: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            invalidated: stats.invalidated,
            expired_removed: stats.expired_removed,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
