//! In-process backend.
//!
//! Holds tables in memory, counts every call and can be told to fail or stall
//! specific operations. Used by the test suites and for running the service
//! without a hosted backend.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{Backend, BackendError, CountQuery, NotificationSink, Result, Table};
use crate::models::{ContentItem, ContentKind, ContentStatus, Notification, Profile, ProfileUpdate};

#[derive(Debug, Default)]
struct Tables {
    content: HashMap<(ContentKind, String), ContentItem>,
    profiles: HashMap<String, Profile>,
    notifications: Vec<Notification>,
}

#[derive(Debug, Default)]
struct Faults {
    failing_counts: HashSet<CountQuery>,
    count_delay: Option<Duration>,
    fail_writes: bool,
    fail_notifications: bool,
}

#[derive(Debug, Default)]
struct Calls {
    counts: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
    notifications: AtomicUsize,
}

// == Memory Backend ==
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    faults: Mutex<Faults>,
    calls: Calls,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(operation: &str) -> BackendError {
    BackendError::Status {
        status: 503,
        message: format!("injected failure: {}", operation),
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // == Seeding ==
    pub fn insert_content(&self, item: ContentItem) {
        lock(&self.tables)
            .content
            .insert((item.kind, item.id.clone()), item);
    }

    pub fn insert_profile(&self, profile: Profile) {
        lock(&self.tables).profiles.insert(profile.id.clone(), profile);
    }

    // == Inspection ==
    pub fn content(&self, kind: ContentKind, id: &str) -> Option<ContentItem> {
        lock(&self.tables)
            .content
            .get(&(kind, id.to_string()))
            .cloned()
    }

    pub fn profile(&self, user_id: &str) -> Option<Profile> {
        lock(&self.tables).profiles.get(user_id).cloned()
    }

    /// Notifications successfully written so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.tables).notifications.clone()
    }

    pub fn count_calls(&self) -> usize {
        self.calls.counts.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.calls.reads.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.calls.writes.load(Ordering::SeqCst)
    }

    /// Notification writes attempted, failed ones included.
    pub fn notify_calls(&self) -> usize {
        self.calls.notifications.load(Ordering::SeqCst)
    }

    // == Fault Injection ==
    /// Makes every future run of `query` fail.
    pub fn fail_count(&self, query: CountQuery) {
        lock(&self.faults).failing_counts.insert(query);
    }

    /// Delays every count reply by `delay`. Rows are counted before the wait,
    /// so a delayed reply reflects the tables as they were when it was asked.
    pub fn delay_counts(&self, delay: Duration) {
        lock(&self.faults).count_delay = Some(delay);
    }

    pub fn fail_writes(&self, fail: bool) {
        lock(&self.faults).fail_writes = fail;
    }

    pub fn fail_notifications(&self, fail: bool) {
        lock(&self.faults).fail_notifications = fail;
    }

    /// Clears every injected fault.
    pub fn heal(&self) {
        *lock(&self.faults) = Faults::default();
    }

    fn count_rows(&self, query: &CountQuery) -> Result<u64> {
        let tables = lock(&self.tables);

        let matches_content = |item: &&ContentItem| match &query.filter {
            None => true,
            Some(("status", value)) => item.status.as_str() == value,
            Some(("user_id", value)) => &item.owner_id == value,
            Some(_) => false,
        };

        let count = match query.table {
            Table::Panoramas | Table::Businesses => {
                let kind = match query.table {
                    Table::Panoramas => ContentKind::Event,
                    _ => ContentKind::Business,
                };
                tables
                    .content
                    .values()
                    .filter(|item| item.kind == kind)
                    .filter(matches_content)
                    .count()
            }
            Table::Profiles => tables
                .profiles
                .values()
                .filter(|profile| match &query.filter {
                    None => true,
                    Some(("role", value)) => profile.role.as_str() == value,
                    Some(("banned", value)) => profile.banned.to_string() == *value,
                    Some(_) => false,
                })
                .count(),
            Table::Notifications => tables.notifications.len(),
        };

        if let Some((column, _)) = &query.filter {
            let known = match query.table {
                Table::Panoramas | Table::Businesses => ["status", "user_id"].contains(column),
                Table::Profiles => ["role", "banned"].contains(column),
                Table::Notifications => false,
            };
            if !known {
                return Err(BackendError::Status {
                    status: 400,
                    message: format!("unknown column '{}' on {}", column, query.table),
                });
            }
        }

        Ok(count as u64)
    }

    fn check_writable(&self, operation: &str) -> Result<()> {
        if lock(&self.faults).fail_writes {
            return Err(injected(operation));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn count(&self, query: &CountQuery) -> Result<u64> {
        self.calls.counts.fetch_add(1, Ordering::SeqCst);

        let (fails, delay) = {
            let faults = lock(&self.faults);
            (faults.failing_counts.contains(query), faults.count_delay)
        };
        let result = if fails {
            Err(injected("count"))
        } else {
            self.count_rows(query)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn fetch_content(&self, kind: ContentKind, id: &str) -> Result<Option<ContentItem>> {
        self.calls.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.content(kind, id))
    }

    async fn update_content_status(
        &self,
        kind: ContentKind,
        id: &str,
        status: ContentStatus,
        rejection_reason: Option<&str>,
    ) -> Result<ContentItem> {
        self.calls.writes.fetch_add(1, Ordering::SeqCst);
        self.check_writable("update_content_status")?;

        let mut tables = lock(&self.tables);
        let item = tables
            .content
            .get_mut(&(kind, id.to_string()))
            .ok_or_else(|| BackendError::NotFound {
                table: kind.table(),
                id: id.to_string(),
            })?;

        item.status = status;
        item.rejection_reason = rejection_reason.map(str::to_string);
        debug!(table = %kind.table(), id, status = %status, "memory backend row updated");
        Ok(item.clone())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        self.calls.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.profile(user_id))
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile> {
        self.calls.writes.fetch_add(1, Ordering::SeqCst);
        self.check_writable("update_profile")?;

        let mut tables = lock(&self.tables);
        let profile = tables
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| BackendError::NotFound {
                table: Table::Profiles,
                id: user_id.to_string(),
            })?;

        update.apply(profile);
        Ok(profile.clone())
    }
}

#[async_trait]
impl NotificationSink for MemoryBackend {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.calls.notifications.fetch_add(1, Ordering::SeqCst);

        if lock(&self.faults).fail_notifications {
            return Err(injected("notify"));
        }

        debug!(user_id = %notification.user_id, kind = ?notification.kind, "memory backend notification stored");
        lock(&self.tables).notifications.push(notification.clone());
        Ok(())
    }
}
