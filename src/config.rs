//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::TtlTable;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Base URL of the hosted backend; `None` runs against the in-memory backend
    pub backend_url: Option<String>,
    /// Service key sent with every backend request
    pub backend_api_key: String,
    /// Admin profile seeded into the in-memory backend
    pub local_admin_id: Option<String>,
    /// Upper bound for a single backend call, in milliseconds
    pub backend_timeout_ms: u64,
    /// Cache TTL per namespace
    pub ttl: TtlTable,
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse().ok())
}

fn millis_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> Duration {
    parse_var(lookup, name)
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 30)
    /// - `BACKEND_URL` - Hosted backend base URL (default: unset, in-memory)
    /// - `BACKEND_API_KEY` - Service key for the backend (default: empty)
    /// - `LOCAL_ADMIN_ID` - Admin seeded when running in-memory (default: unset)
    /// - `BACKEND_TIMEOUT_MS` - Per-call backend timeout (default: 10000)
    /// - `DEFAULT_TTL_MS`, `ADMIN_STATS_TTL_MS`, `USER_ROLE_TTL_MS`,
    ///   `CONTENT_TTL_MS`, `CATEGORIES_TTL_MS` - Cache TTLs
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from any name -> value source. Unset or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let content_ttl = millis_var(&lookup, "CONTENT_TTL_MS", defaults.ttl.panoramas);

        Self {
            server_port: parse_var(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var(&lookup, "CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
            backend_url: non_blank(lookup("BACKEND_URL")),
            backend_api_key: lookup("BACKEND_API_KEY").unwrap_or_default(),
            local_admin_id: non_blank(lookup("LOCAL_ADMIN_ID")),
            backend_timeout_ms: parse_var(&lookup, "BACKEND_TIMEOUT_MS")
                .unwrap_or(defaults.backend_timeout_ms),
            ttl: TtlTable {
                admin_stats: millis_var(&lookup, "ADMIN_STATS_TTL_MS", defaults.ttl.admin_stats),
                user_role: millis_var(&lookup, "USER_ROLE_TTL_MS", defaults.ttl.user_role),
                panoramas: content_ttl,
                businesses: content_ttl,
                categories: millis_var(&lookup, "CATEGORIES_TTL_MS", defaults.ttl.categories),
                default: millis_var(&lookup, "DEFAULT_TTL_MS", defaults.ttl.default),
            },
        }
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 30,
            backend_url: None,
            backend_api_key: String::new(),
            local_admin_id: None,
            backend_timeout_ms: 10_000,
            ttl: TtlTable::default(),
        }
    }
}
