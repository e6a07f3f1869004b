//! Admin Module
//!
//! Dashboard statistics and moderation handlers sharing one cache.
//!
//! Every operation starts with an authorization gate. Mutations then write to
//! the backend, invalidate the cache entries the write made stale, and finally
//! try to notify the affected user.

pub mod auth;
mod moderation;
mod stats;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::backend::{self, with_timeout, Backend, NotificationSink};
use crate::cache::SharedCache;
use crate::error::{AdminError, Result};
use crate::models::{Notification, Permission, Role};

pub use auth::{Authorizer, ProfileAuthorizer};

// == Admin Service ==
/// Entry point for the admin operations.
///
/// Cheap to clone; all collaborators are shared handles.
#[derive(Clone)]
pub struct AdminService {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn NotificationSink>,
    authorizer: Arc<dyn Authorizer>,
    cache: SharedCache,
    /// Upper bound for every individual backend call
    backend_timeout: Duration,
}

impl AdminService {
    pub fn new(
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn NotificationSink>,
        authorizer: Arc<dyn Authorizer>,
        cache: SharedCache,
        backend_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            notifier,
            authorizer,
            cache,
            backend_timeout,
        }
    }

    /// Builds a service whose roles come from the backend's profiles table.
    pub fn with_profile_authorizer(
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn NotificationSink>,
        cache: SharedCache,
        backend_timeout: Duration,
    ) -> Self {
        let authorizer = Arc::new(ProfileAuthorizer::new(
            backend.clone(),
            cache.clone(),
            backend_timeout,
        ));
        Self::new(backend, notifier, authorizer, cache, backend_timeout)
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // == Authorization Gate ==
    /// Fails with [`AdminError::Unauthorized`] unless `actor` holds `permission`.
    async fn authorize(&self, actor: &str, permission: Permission) -> Result<Role> {
        let role = with_timeout(self.backend_timeout, self.authorizer.role_of(actor)).await?;

        match role {
            Some(role) if role.allows(permission) => Ok(role),
            _ => {
                warn!(actor, ?permission, "admin action refused");
                Err(AdminError::Unauthorized(actor.to_string()))
            }
        }
    }

    /// Runs one backend call under the configured timeout.
    async fn call<T>(&self, call: impl Future<Output = backend::Result<T>>) -> Result<T> {
        Ok(with_timeout(self.backend_timeout, call).await?)
    }

    // == Notifications ==
    /// Writes a notification, logging and swallowing any failure.
    async fn notify_best_effort(&self, notification: &Notification) {
        let result = with_timeout(self.backend_timeout, self.notifier.notify(notification)).await;

        if let Err(e) = result {
            warn!(
                user_id = %notification.user_id,
                kind = ?notification.kind,
                error = %e,
                "notification write failed"
            );
        }
    }
}
