//! Authorization collaborator.
//!
//! Resolves an identity to the role that counts for permission checks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::backend::{self, with_timeout, Backend};
use crate::cache::{Namespace, SharedCache};
use crate::models::Role;

/// Answers "which role does this identity hold?".
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Effective role, `None` for unknown or banned identities.
    async fn role_of(&self, identity: &str) -> backend::Result<Option<Role>>;
}

// == Profile Authorizer ==
/// Reads roles from the profiles table, caching them under `userRole_<id>`.
///
/// Handlers that change a role or a ban flag drop the cached key, so a stale
/// role survives at most until the `userRole` TTL elapses for changes made
/// outside this service.
pub struct ProfileAuthorizer {
    backend: Arc<dyn Backend>,
    cache: SharedCache,
    timeout: Duration,
}

impl ProfileAuthorizer {
    pub fn new(backend: Arc<dyn Backend>, cache: SharedCache, timeout: Duration) -> Self {
        Self {
            backend,
            cache,
            timeout,
        }
    }
}

#[async_trait]
impl Authorizer for ProfileAuthorizer {
    async fn role_of(&self, identity: &str) -> backend::Result<Option<Role>> {
        let key = Namespace::UserRole.key(identity);

        let generation = {
            let mut cache = self.cache.write().await;
            if let Some(role) = cache.get_json::<Option<Role>>(&key) {
                return Ok(role);
            }
            cache.generation(Namespace::UserRole)
        };

        let profile = with_timeout(self.timeout, self.backend.fetch_profile(identity)).await?;
        let role = profile.and_then(|p| p.effective_role());
        debug!(identity, role = ?role, "role resolved from profile");

        // A ban or role change that landed meanwhile wins over this read
        self.cache
            .write()
            .await
            .set_json_if_generation(key, &role, generation);
        Ok(role)
    }
}
