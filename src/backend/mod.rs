//! Backend Module
//!
//! Collaborator seams over the hosted backend: the query/write client and the
//! notification writer. Implementations can be swapped (REST, in-memory).

mod memory;
mod rest;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ContentItem, ContentKind, ContentStatus, Notification, Profile, ProfileUpdate};

pub use memory::MemoryBackend;
pub use rest::RestBackend;

// == Backend Error ==
/// Failures reported by a backend call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Transport-level failure (connection refused, TLS, ...)
    #[error("Backend request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("Malformed backend response: {0}")]
    Decode(String),

    /// A write targeted a row that does not exist
    #[error("No {table} row with id '{id}'")]
    NotFound { table: Table, id: String },

    /// The call did not complete within the configured limit
    #[error("Backend call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Request(err.to_string())
        }
    }
}

/// Convenience Result type for backend calls.
pub type Result<T> = std::result::Result<T, BackendError>;

// == Table ==
/// Backend tables the admin core touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Panoramas,
    Businesses,
    Profiles,
    Notifications,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Panoramas => "panoramas",
            Table::Businesses => "businesses",
            Table::Profiles => "profiles",
            Table::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Count Query ==
/// Row count over a table with an optional equality filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountQuery {
    pub table: Table,
    pub filter: Option<(&'static str, String)>,
}

impl CountQuery {
    /// Counts every row of `table`.
    pub fn all(table: Table) -> Self {
        Self {
            table,
            filter: None,
        }
    }

    /// Counts rows of `table` where `column = value`.
    pub fn eq(table: Table, column: &'static str, value: impl Into<String>) -> Self {
        Self {
            table,
            filter: Some((column, value.into())),
        }
    }

    /// Counts content rows in a given moderation state.
    pub fn by_status(kind: ContentKind, status: ContentStatus) -> Self {
        Self::eq(kind.table(), "status", status.as_str())
    }
}

impl fmt::Display for CountQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some((column, value)) => write!(f, "{}[{}={}]", self.table, column, value),
            None => write!(f, "{}[*]", self.table),
        }
    }
}

// == Collaborator Traits ==
/// Query and write access to the hosted Postgres tables.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Number of rows matching the query.
    async fn count(&self, query: &CountQuery) -> Result<u64>;

    /// Loads one content item, `None` if it does not exist.
    async fn fetch_content(&self, kind: ContentKind, id: &str) -> Result<Option<ContentItem>>;

    /// Writes a new moderation status and returns the updated row.
    async fn update_content_status(
        &self,
        kind: ContentKind,
        id: &str,
        status: ContentStatus,
        rejection_reason: Option<&str>,
    ) -> Result<ContentItem>;

    /// Loads one profile, `None` if it does not exist.
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Applies a profile update and returns the updated row.
    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile>;
}

/// Writes notification records.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

// == Timeout ==
/// Runs a backend call, failing with [`BackendError::Timeout`] past `limit`.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout {
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}
