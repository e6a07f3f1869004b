//! Panorama Admin - moderation API server
//!
//! Serves the admin dashboard statistics and moderation actions over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use panorama_admin::api::create_router;
use panorama_admin::backend::{Backend, MemoryBackend, NotificationSink, RestBackend};
use panorama_admin::cache::{self, CacheStore};
use panorama_admin::models::{Profile, Role};
use panorama_admin::{spawn_cleanup_task, AdminService, AppState, Config};

/// Main entry point for the admin API server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and the backend client
/// 4. Start background TTL cleanup task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panorama_admin=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Panorama Admin API");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cleanup_interval={}s, backend_timeout={}ms, ttl={:?}",
        config.server_port, config.cleanup_interval, config.backend_timeout_ms, config.ttl
    );

    let cache = cache::shared(CacheStore::new(config.ttl));

    let (backend, notifier): (Arc<dyn Backend>, Arc<dyn NotificationSink>) =
        match &config.backend_url {
            Some(url) => {
                let rest = Arc::new(
                    RestBackend::new(url, &config.backend_api_key)
                        .context("failed to build backend client")?,
                );
                info!("Using hosted backend at {}", url);
                (
                    rest.clone() as Arc<dyn Backend>,
                    rest as Arc<dyn NotificationSink>,
                )
            }
            None => {
                warn!("BACKEND_URL not set, using an in-memory backend");
                let memory = Arc::new(MemoryBackend::new());
                if let Some(admin_id) = &config.local_admin_id {
                    memory.insert_profile(Profile::new(
                        admin_id.as_str(),
                        "Local admin",
                        Role::Admin,
                    ));
                    info!("Seeded local admin profile '{}'", admin_id);
                }
                (
                    memory.clone() as Arc<dyn Backend>,
                    memory as Arc<dyn NotificationSink>,
                )
            }
        };

    let service = AdminService::with_profile_authorizer(
        backend,
        notifier,
        cache.clone(),
        config.backend_timeout(),
    );

    let cleanup_handle = spawn_cleanup_task(cache, config.cleanup_interval);
    info!("Background cleanup task started");

    let app = create_router(AppState::new(service));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
