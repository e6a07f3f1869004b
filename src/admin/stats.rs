//! Aggregate dashboard statistics.

use tracing::{debug, info, warn};

use super::AdminService;
use crate::backend::{with_timeout, CountQuery, Table};
use crate::cache::Namespace;
use crate::error::Result;
use crate::models::{AdminStats, ContentKind, ContentStatus, Metric, Permission, StatsCounts};

impl AdminService {
    // == Fetch Admin Stats ==
    /// Returns the dashboard snapshot for `identity`.
    ///
    /// Served from `adminStats_<identity>` while fresh. On a miss the four
    /// counts are queried concurrently; a failed count marks only its own
    /// metric unavailable. Degraded snapshots are returned but not cached, and
    /// neither is a snapshot whose queries overlapped an invalidation.
    pub async fn fetch_admin_stats(&self, identity: &str) -> Result<AdminStats> {
        self.authorize(identity, Permission::Moderate).await?;

        let key = Namespace::AdminStats.key(identity);
        let generation = {
            let mut cache = self.cache.write().await;
            if let Some(counts) = cache.get_json::<StatsCounts>(&key) {
                debug!(identity, "admin stats served from cache");
                return Ok(counts.into());
            }
            cache.generation(Namespace::AdminStats)
        };

        let stats = self.query_stats().await;

        match stats.complete_counts() {
            Some(counts) => {
                let stored = self
                    .cache
                    .write()
                    .await
                    .set_json_if_generation(key, &counts, generation);
                info!(identity, ?counts, cached = stored, "admin stats recomputed");
            }
            None => warn!(
                identity,
                unavailable = ?stats.unavailable(),
                "serving degraded admin stats"
            ),
        }

        Ok(stats)
    }

    async fn query_stats(&self) -> AdminStats {
        let pending = CountQuery::by_status(ContentKind::Event, ContentStatus::Pending);
        let published = CountQuery::by_status(ContentKind::Event, ContentStatus::Published);
        let rejected = CountQuery::by_status(ContentKind::Event, ContentStatus::Rejected);
        let users = CountQuery::all(Table::Profiles);

        let (pendientes, publicados, rechazados, usuarios) = tokio::join!(
            self.count_metric("pendientes", &pending),
            self.count_metric("publicados", &published),
            self.count_metric("rechazados", &rejected),
            self.count_metric("usuarios", &users),
        );

        AdminStats {
            pendientes,
            publicados,
            rechazados,
            usuarios,
        }
    }

    async fn count_metric(&self, metric: &'static str, query: &CountQuery) -> Metric {
        let result = with_timeout(self.backend_timeout, self.backend.count(query)).await;

        if let Err(e) = &result {
            warn!(metric, query = %query, error = %e, "count query failed");
        }
        result.into()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::cache::{shared, CacheStore};
    use crate::error::AdminError;
    use crate::models::{ContentItem, Profile, Role};

    fn setup(timeout: Duration) -> (Arc<MemoryBackend>, AdminService) {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_profile(Profile::new("admin1", "Root", Role::Admin));
        backend.insert_profile(Profile::new("mod1", "Mod", Role::Moderator));
        backend.insert_profile(Profile::new("U1", "Ana", Role::User));
        backend.insert_content(ContentItem::pending(ContentKind::Event, "E1", "U1", "Jazz"));
        backend.insert_content(ContentItem::pending(ContentKind::Event, "E2", "U1", "Rock"));
        backend.insert_content(
            ContentItem::pending(ContentKind::Event, "E3", "U1", "Film")
                .with_status(ContentStatus::Rejected),
        );

        let service = AdminService::with_profile_authorizer(
            backend.clone(),
            backend.clone(),
            shared(CacheStore::default()),
            timeout,
        );
        (backend, service)
    }

    #[tokio::test]
    async fn test_stats_counts() {
        let (_backend, service) = setup(Duration::from_secs(5));

        let stats = service.fetch_admin_stats("admin1").await.unwrap();

        assert_eq!(
            stats.complete_counts(),
            Some(StatsCounts {
                pendientes: 2,
                publicados: 0,
                rechazados: 1,
                usuarios: 3,
            })
        );
    }

    #[tokio::test]
    async fn test_cache_hit_issues_no_queries() {
        let (backend, service) = setup(Duration::from_secs(5));

        let first = service.fetch_admin_stats("admin1").await.unwrap();
        assert_eq!(backend.count_calls(), 4);

        let second = service.fetch_admin_stats("admin1").await.unwrap();
        assert_eq!(backend.count_calls(), 4);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_cache_is_scoped_per_identity() {
        let (backend, service) = setup(Duration::from_secs(5));

        service.fetch_admin_stats("admin1").await.unwrap();
        service.fetch_admin_stats("mod1").await.unwrap();

        assert_eq!(backend.count_calls(), 8);
        let mut cache = service.cache().write().await;
        assert!(cache.get("adminStats_admin1").is_some());
        assert!(cache.get("adminStats_mod1").is_some());
    }

    #[tokio::test]
    async fn test_partial_failure_degrades_one_metric() {
        let (backend, service) = setup(Duration::from_secs(5));
        backend.fail_count(CountQuery::by_status(
            ContentKind::Event,
            ContentStatus::Pending,
        ));

        let stats = service.fetch_admin_stats("admin1").await.unwrap();

        assert_eq!(stats.pendientes, Metric::Unavailable);
        assert_eq!(stats.pendientes.value_or_zero(), 0);
        assert_eq!(stats.publicados, Metric::Available(0));
        assert_eq!(stats.rechazados, Metric::Available(1));
        assert_eq!(stats.usuarios, Metric::Available(3));
    }

    #[tokio::test]
    async fn test_degraded_snapshot_is_not_cached() {
        let (backend, service) = setup(Duration::from_secs(5));
        backend.fail_count(CountQuery::all(Table::Profiles));

        service.fetch_admin_stats("admin1").await.unwrap();
        backend.heal();
        let stats = service.fetch_admin_stats("admin1").await.unwrap();

        assert_eq!(backend.count_calls(), 8);
        assert!(stats.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_counts_time_out() {
        let (backend, service) = setup(Duration::from_millis(200));
        backend.delay_counts(Duration::from_secs(30));

        let stats = service.fetch_admin_stats("admin1").await.unwrap();

        assert_eq!(stats.unavailable().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_overlapping_approval_is_not_cached() {
        let (backend, service) = setup(Duration::from_secs(5));
        backend.delay_counts(Duration::from_millis(300));

        let reader = tokio::spawn({
            let service = service.clone();
            async move { service.fetch_admin_stats("admin1").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        service
            .approve("admin1", ContentKind::Event, "E1")
            .await
            .unwrap();

        // The in-flight read still answers with what it counted
        let overlapping = reader.await.unwrap().unwrap();
        assert_eq!(overlapping.pendientes.value_or_zero(), 2);
        assert!(service
            .cache()
            .write()
            .await
            .get(&Namespace::AdminStats.key("admin1"))
            .is_none());

        let fresh = service.fetch_admin_stats("admin1").await.unwrap();
        assert_eq!(fresh.pendientes.value_or_zero(), 1);
        assert_eq!(fresh.publicados.value_or_zero(), 1);
    }

    #[tokio::test]
    async fn test_regular_user_is_refused() {
        let (backend, service) = setup(Duration::from_secs(5));

        let result = service.fetch_admin_stats("U1").await;

        assert!(matches!(result, Err(AdminError::Unauthorized(_))));
        assert_eq!(backend.count_calls(), 0);
    }
}
