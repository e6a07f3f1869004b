//! Moderation handlers: content review and user management.

use tracing::info;

use super::AdminService;
use crate::cache::Namespace;
use crate::error::{AdminError, Result};
use crate::models::{
    ContentItem, ContentKind, ContentStatus, Notification, Permission, Profile, ProfileUpdate,
    Role,
};

impl AdminService {
    // == Content Review ==
    /// Publishes a pending item.
    pub async fn approve(&self, actor: &str, kind: ContentKind, id: &str) -> Result<ContentItem> {
        self.review(actor, kind, id, ContentStatus::Published, None)
            .await
    }

    /// Rejects a pending item, optionally telling the author why.
    pub async fn reject(
        &self,
        actor: &str,
        kind: ContentKind,
        id: &str,
        reason: Option<&str>,
    ) -> Result<ContentItem> {
        self.review(actor, kind, id, ContentStatus::Rejected, reason)
            .await
    }

    async fn review(
        &self,
        actor: &str,
        kind: ContentKind,
        id: &str,
        target: ContentStatus,
        reason: Option<&str>,
    ) -> Result<ContentItem> {
        self.authorize(actor, Permission::Moderate).await?;

        let item = self
            .call(self.backend.fetch_content(kind, id))
            .await?
            .ok_or_else(|| AdminError::NotFound {
                entity: kind.as_str(),
                id: id.to_string(),
            })?;

        if !item.status.can_transition_to(target) {
            return Err(AdminError::InvalidTransition {
                id: id.to_string(),
                from: item.status,
                to: target,
            });
        }

        let updated = self
            .call(self.backend.update_content_status(kind, id, target, reason))
            .await?;

        // Counts changed globally, so every admin's snapshot goes
        {
            let mut cache = self.cache.write().await;
            cache.invalidate_namespace(Namespace::AdminStats);
            cache.invalidate_namespace(kind.namespace());
        }
        info!(actor, %kind, id, status = %target, "content reviewed");

        let notification = match target {
            ContentStatus::Published => Notification::publication_approved(&updated),
            _ => Notification::publication_rejected(&updated, reason),
        };
        self.notify_best_effort(&notification).await;

        Ok(updated)
    }

    // == User Management ==
    /// Bans a user. Moderators cannot ban admins; nobody can ban themselves.
    ///
    /// Banning someone already banned returns the profile untouched.
    pub async fn ban(&self, actor: &str, user_id: &str, reason: Option<&str>) -> Result<Profile> {
        let actor_role = self.authorize(actor, Permission::Moderate).await?;
        if actor == user_id {
            return Err(AdminError::Forbidden("cannot ban yourself".to_string()));
        }

        let target = self.load_profile(user_id).await?;
        if target.role == Role::Admin && actor_role != Role::Admin {
            return Err(AdminError::Forbidden(
                "only admins can ban other admins".to_string(),
            ));
        }
        if target.banned {
            return Ok(target);
        }

        let update = ProfileUpdate::Ban {
            reason: reason.map(str::to_string),
        };
        let updated = self.call(self.backend.update_profile(user_id, &update)).await?;

        self.forget_role(user_id).await;
        info!(actor, user_id, "user banned");

        self.notify_best_effort(&Notification::account_banned(user_id, reason))
            .await;
        Ok(updated)
    }

    /// Lifts a ban. A user who is not banned is returned untouched.
    pub async fn unban(&self, actor: &str, user_id: &str) -> Result<Profile> {
        self.authorize(actor, Permission::Moderate).await?;
        let target = self.load_profile(user_id).await?;
        if !target.banned {
            return Ok(target);
        }

        let updated = self
            .call(self.backend.update_profile(user_id, &ProfileUpdate::Unban))
            .await?;

        self.forget_role(user_id).await;
        info!(actor, user_id, "user unbanned");

        self.notify_best_effort(&Notification::account_unbanned(user_id))
            .await;
        Ok(updated)
    }

    /// Sets a user's role. Admin only, and never on the caller's own profile.
    ///
    /// Setting the role a user already has is a no-op: no write, no
    /// notification.
    pub async fn change_role(&self, actor: &str, user_id: &str, role: Role) -> Result<Profile> {
        self.authorize(actor, Permission::ManageRoles).await?;
        if actor == user_id {
            return Err(AdminError::Forbidden(
                "cannot change your own role".to_string(),
            ));
        }

        let target = self.load_profile(user_id).await?;
        if target.role == role {
            return Ok(target);
        }

        let updated = self
            .call(
                self.backend
                    .update_profile(user_id, &ProfileUpdate::ChangeRole(role)),
            )
            .await?;

        self.forget_role(user_id).await;
        // A demoted moderator must not keep reading a cached dashboard
        self.cache
            .write()
            .await
            .invalidate_namespace(Namespace::AdminStats);
        info!(actor, user_id, from = %target.role, to = %role, "role changed");

        self.notify_best_effort(&Notification::role_changed(user_id, role))
            .await;
        Ok(updated)
    }

    async fn load_profile(&self, user_id: &str) -> Result<Profile> {
        self.call(self.backend.fetch_profile(user_id))
            .await?
            .ok_or_else(|| AdminError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            })
    }

    async fn forget_role(&self, user_id: &str) {
        self.cache
            .write()
            .await
            .invalidate_key(&Namespace::UserRole.key(user_id));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::cache::{shared, CacheStore};
    use crate::models::NotificationKind;

    fn setup() -> (Arc<MemoryBackend>, AdminService) {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_profile(Profile::new("admin1", "Root", Role::Admin));
        backend.insert_profile(Profile::new("admin2", "Other root", Role::Admin));
        backend.insert_profile(Profile::new("mod1", "Mod", Role::Moderator));
        backend.insert_profile(Profile::new("U1", "Ana", Role::User));
        backend.insert_content(ContentItem::pending(ContentKind::Event, "E1", "U1", "Jazz"));
        backend.insert_content(ContentItem::pending(ContentKind::Business, "B1", "U1", "Cafe"));
        backend.insert_content(
            ContentItem::pending(ContentKind::Event, "E2", "U1", "Old")
                .with_status(ContentStatus::Published),
        );

        let service = AdminService::with_profile_authorizer(
            backend.clone(),
            backend.clone(),
            shared(CacheStore::default()),
            Duration::from_secs(5),
        );
        (backend, service)
    }

    #[tokio::test]
    async fn test_approve_publishes_and_notifies() {
        let (backend, service) = setup();

        let item = service.approve("mod1", ContentKind::Event, "E1").await.unwrap();

        assert_eq!(item.status, ContentStatus::Published);
        let notes = backend.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::PublicationApproved);
        assert_eq!(notes[0].user_id, "U1");
        assert_eq!(notes[0].related_id.as_deref(), Some("E1"));
    }

    #[tokio::test]
    async fn test_reject_stores_reason() {
        let (backend, service) = setup();

        let item = service
            .reject("mod1", ContentKind::Business, "B1", Some("no address"))
            .await
            .unwrap();

        assert_eq!(item.status, ContentStatus::Rejected);
        assert_eq!(item.rejection_reason.as_deref(), Some("no address"));
        assert_eq!(
            backend.notifications()[0].kind,
            NotificationKind::PublicationRejected
        );
    }

    #[tokio::test]
    async fn test_review_invalidates_stats_and_listings() {
        let (_backend, service) = setup();
        {
            let mut cache = service.cache().write().await;
            cache.set("adminStats_admin1", json!({}));
            cache.set("adminStats_mod1", json!({}));
            cache.set("panoramas_featured", json!([]));
            cache.set("businesses_featured", json!([]));
        }

        service.approve("mod1", ContentKind::Event, "E1").await.unwrap();

        let mut cache = service.cache().write().await;
        assert!(cache.get("adminStats_admin1").is_none());
        assert!(cache.get("adminStats_mod1").is_none());
        assert!(cache.get("panoramas_featured").is_none());
        assert!(cache.get("businesses_featured").is_some());
    }

    #[tokio::test]
    async fn test_unauthorized_actor_never_writes() {
        let (backend, service) = setup();

        let approve = service.approve("U1", ContentKind::Event, "E1").await;
        let reject = service.reject("U1", ContentKind::Event, "E1", None).await;
        let ban = service.ban("U1", "mod1", None).await;
        let role = service.change_role("mod1", "U1", Role::Moderator).await;

        assert!(matches!(approve, Err(AdminError::Unauthorized(_))));
        assert!(matches!(reject, Err(AdminError::Unauthorized(_))));
        assert!(matches!(ban, Err(AdminError::Unauthorized(_))));
        assert!(matches!(role, Err(AdminError::Unauthorized(_))));
        assert_eq!(backend.write_calls(), 0);
        assert_eq!(backend.notify_calls(), 0);
    }

    #[tokio::test]
    async fn test_only_pending_items_can_be_reviewed() {
        let (backend, service) = setup();

        let result = service.reject("mod1", ContentKind::Event, "E2", None).await;

        assert!(matches!(
            result,
            Err(AdminError::InvalidTransition {
                from: ContentStatus::Published,
                to: ContentStatus::Rejected,
                ..
            })
        ));
        assert_eq!(backend.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_item() {
        let (_backend, service) = setup();

        let result = service.approve("mod1", ContentKind::Event, "nope").await;
        assert!(matches!(result, Err(AdminError::NotFound { entity: "event", .. })));
    }

    #[tokio::test]
    async fn test_write_failure_skips_invalidation_and_notification() {
        let (backend, service) = setup();
        service
            .cache()
            .write()
            .await
            .set("adminStats_admin1", json!({}));
        backend.fail_writes(true);

        let result = service.approve("mod1", ContentKind::Event, "E1").await;

        assert!(matches!(result, Err(AdminError::Backend(_))));
        assert!(service.cache().write().await.get("adminStats_admin1").is_some());
        assert_eq!(backend.notify_calls(), 0);
    }

    #[tokio::test]
    async fn test_notification_failure_is_swallowed() {
        let (backend, service) = setup();
        backend.fail_notifications(true);

        let item = service.approve("mod1", ContentKind::Event, "E1").await.unwrap();

        assert_eq!(item.status, ContentStatus::Published);
        assert_eq!(
            backend.content(ContentKind::Event, "E1").unwrap().status,
            ContentStatus::Published
        );
        assert_eq!(backend.notify_calls(), 1);
        assert!(backend.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_ban_revokes_cached_permissions() {
        let (_backend, service) = setup();

        // mod1's role is now cached
        service.fetch_admin_stats("mod1").await.unwrap();

        let profile = service.ban("admin1", "mod1", Some("abuse")).await.unwrap();
        assert!(profile.banned);

        let result = service.fetch_admin_stats("mod1").await;
        assert!(matches!(result, Err(AdminError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_ban_guards() {
        let (backend, service) = setup();

        let own = service.ban("mod1", "mod1", None).await;
        let admin = service.ban("mod1", "admin1", None).await;
        let missing = service.ban("mod1", "ghost", None).await;

        assert!(matches!(own, Err(AdminError::Forbidden(_))));
        assert!(matches!(admin, Err(AdminError::Forbidden(_))));
        assert!(matches!(missing, Err(AdminError::NotFound { entity: "user", .. })));
        assert_eq!(backend.write_calls(), 0);

        // Admins may ban admins
        assert!(service.ban("admin1", "admin2", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_unban_restores_and_notifies() {
        let (backend, service) = setup();

        service.ban("admin1", "U1", None).await.unwrap();
        let profile = service.unban("mod1", "U1").await.unwrap();

        assert!(!profile.banned);
        let kinds: Vec<_> = backend.notifications().iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NotificationKind::AccountBanned, NotificationKind::AccountUnbanned]
        );
    }

    #[tokio::test]
    async fn test_repeated_ban_state_is_a_noop() {
        let (backend, service) = setup();

        let unbanned = service.unban("mod1", "U1").await.unwrap();
        assert!(!unbanned.banned);
        assert_eq!(backend.write_calls(), 0);

        service.ban("mod1", "U1", Some("spam")).await.unwrap();
        let writes = backend.write_calls();
        let again = service.ban("mod1", "U1", Some("spam again")).await.unwrap();

        assert!(again.banned);
        assert_eq!(backend.write_calls(), writes);
        let kinds: Vec<_> = backend.notifications().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::AccountBanned]);
    }

    #[tokio::test]
    async fn test_change_role_grants_access() {
        let (backend, service) = setup();

        assert!(service.fetch_admin_stats("U1").await.is_err());

        let profile = service
            .change_role("admin1", "U1", Role::Moderator)
            .await
            .unwrap();
        assert_eq!(profile.role, Role::Moderator);

        assert!(service.fetch_admin_stats("U1").await.is_ok());
        assert_eq!(
            backend.notifications().last().map(|n| n.kind),
            Some(NotificationKind::RoleChanged)
        );
    }

    #[tokio::test]
    async fn test_change_role_guards() {
        let (backend, service) = setup();

        let own = service.change_role("admin1", "admin1", Role::User).await;
        assert!(matches!(own, Err(AdminError::Forbidden(_))));

        let same = service
            .change_role("admin1", "mod1", Role::Moderator)
            .await
            .unwrap();
        assert_eq!(same.role, Role::Moderator);
        assert_eq!(backend.write_calls(), 0);
        assert_eq!(backend.notify_calls(), 0);
    }
}
