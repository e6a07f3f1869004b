//! Cache Namespace Module
//!
//! Maps cache keys to their namespace and the namespace to its TTL.

use std::fmt;
use std::time::Duration;

/// Separator between a key's namespace prefix and its discriminator.
pub const NAMESPACE_SEPARATOR: char = '_';

// == Namespace ==
/// Known cache namespaces, each with its own TTL policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Per-admin dashboard snapshots (`adminStats_<adminId>`)
    AdminStats,
    /// Resolved roles used by the authorization gate (`userRole_<userId>`)
    UserRole,
    /// Event listings
    Panoramas,
    /// Business listings
    Businesses,
    /// Category lookups
    Categories,
}

impl Namespace {
    pub const ALL: [Namespace; 5] = [
        Namespace::AdminStats,
        Namespace::UserRole,
        Namespace::Panoramas,
        Namespace::Businesses,
        Namespace::Categories,
    ];

    /// Key prefix used for this namespace.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::AdminStats => "adminStats",
            Namespace::UserRole => "userRole",
            Namespace::Panoramas => "panoramas",
            Namespace::Businesses => "businesses",
            Namespace::Categories => "categories",
        }
    }

    /// Builds a full cache key from this namespace and a discriminator.
    pub fn key(&self, discriminator: &str) -> String {
        format!("{}{}{}", self.as_str(), NAMESPACE_SEPARATOR, discriminator)
    }

    /// Parses a namespace prefix. Unknown prefixes return `None`.
    pub fn parse(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.as_str() == prefix)
    }

    /// Resolves the namespace a key belongs to.
    pub fn of_key(key: &str) -> Option<Self> {
        Self::parse(prefix_of(key))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the part of `key` before the first separator, or the whole key.
pub fn prefix_of(key: &str) -> &str {
    key.split(NAMESPACE_SEPARATOR).next().unwrap_or(key)
}

// == TTL Table ==
/// Per-namespace TTLs, fixed for the lifetime of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlTable {
    pub admin_stats: Duration,
    pub user_role: Duration,
    pub panoramas: Duration,
    pub businesses: Duration,
    pub categories: Duration,
    /// Applies to every key outside the known namespaces
    pub default: Duration,
}

impl TtlTable {
    /// TTL for a known namespace.
    pub fn for_namespace(&self, namespace: Namespace) -> Duration {
        match namespace {
            Namespace::AdminStats => self.admin_stats,
            Namespace::UserRole => self.user_role,
            Namespace::Panoramas => self.panoramas,
            Namespace::Businesses => self.businesses,
            Namespace::Categories => self.categories,
        }
    }

    /// TTL for a full key, falling back to the default TTL.
    pub fn for_key(&self, key: &str) -> Duration {
        Namespace::of_key(key)
            .map(|ns| self.for_namespace(ns))
            .unwrap_or(self.default)
    }
}

impl Default for TtlTable {
    fn default() -> Self {
        Self {
            admin_stats: Duration::from_secs(60),
            user_role: Duration::from_secs(120),
            panoramas: Duration::from_secs(30),
            businesses: Duration::from_secs(30),
            categories: Duration::from_secs(300),
            default: Duration::from_secs(30),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_of() {
        assert_eq!(prefix_of("adminStats_abc"), "adminStats");
        assert_eq!(prefix_of("adminStats_a_b"), "adminStats");
        assert_eq!(prefix_of("categories"), "categories");
        assert_eq!(prefix_of("_leading"), "");
    }

    #[test]
    fn test_namespace_key_roundtrip() {
        for ns in Namespace::ALL {
            let key = ns.key("u1");
            assert_eq!(Namespace::of_key(&key), Some(ns));
        }
    }

    #[test]
    fn test_unknown_namespace() {
        assert_eq!(Namespace::of_key("sessions_42"), None);
        // Namespace match is exact, not case-insensitive
        assert_eq!(Namespace::of_key("adminstats_42"), None);
    }

    #[test]
    fn test_ttl_for_key() {
        let table = TtlTable::default();

        assert_eq!(table.for_key("adminStats_admin1"), Duration::from_secs(60));
        assert_eq!(table.for_key("categories"), Duration::from_secs(300));
        assert_eq!(table.for_key("userRole_u1"), Duration::from_secs(120));
        assert_eq!(table.for_key("whatever_else"), table.default);
        assert_eq!(table.for_key(""), table.default);
    }
}
