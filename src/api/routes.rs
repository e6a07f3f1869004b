//! API Routes
//!
//! Configures the Axum router with the admin endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    approve_handler, ban_handler, cache_stats_handler, health_handler, reject_handler,
    role_handler, stats_handler, unban_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /admin/stats` - Dashboard snapshot for the caller
/// - `POST /admin/content/:kind/:id/approve` - Publish a pending item
/// - `POST /admin/content/:kind/:id/reject` - Reject a pending item
/// - `POST /admin/users/:id/ban` - Ban a user
/// - `POST /admin/users/:id/unban` - Lift a ban
/// - `PUT /admin/users/:id/role` - Change a user's role
/// - `GET /cache/stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (the admin UI is served from another host)
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin = Router::new()
        .route("/stats", get(stats_handler))
        .route("/content/:kind/:id/approve", post(approve_handler))
        .route("/content/:kind/:id/reject", post(reject_handler))
        .route("/users/:id/ban", post(ban_handler))
        .route("/users/:id/unban", post(unban_handler))
        .route("/users/:id/role", put(role_handler));

    Router::new()
        .nest("/admin", admin)
        .route("/cache/stats", get(cache_stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminService;
    use crate::backend::MemoryBackend;
    use crate::cache::{shared, CacheStore};
    use crate::models::{Profile, Role};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_profile(Profile::new("admin1", "Root", Role::Admin));
        let service = AdminService::with_profile_authorizer(
            backend.clone(),
            backend,
            shared(CacheStore::default()),
            Duration::from_secs(5),
        );
        create_router(AppState::new(service))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_requires_identity() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/stats")
                    .header("x-actor-id", "admin1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_approve_missing_item() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/content/events/nope/approve")
                    .header("x-actor-id", "admin1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
