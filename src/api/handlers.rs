//! API Handlers
//!
//! HTTP request handlers for the admin endpoints. The acting identity comes
//! from the `x-actor-id` header.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    Json,
};

use crate::admin::AdminService;
use crate::cache::SharedCache;
use crate::error::{AdminError, Result};
use crate::models::{
    AdminStats, BanRequest, CacheStatsResponse, ContentActionResponse, ContentKind,
    HealthResponse, RejectRequest, RoleChangeRequest, UserActionResponse,
};

/// Header carrying the identity performing the request
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: AdminService,
}

impl AppState {
    pub fn new(service: AdminService) -> Self {
        Self { service }
    }

    pub fn cache(&self) -> &SharedCache {
        self.service.cache()
    }
}

// == Actor Extractor ==
/// Identity of the caller, taken from [`ACTOR_HEADER`].
#[derive(Debug, Clone)]
pub struct Actor(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Actor(v.to_string()))
            .ok_or(AdminError::MissingIdentity)
    }
}

fn parse_kind(segment: &str) -> Result<ContentKind> {
    ContentKind::from_path_segment(segment)
        .ok_or_else(|| AdminError::InvalidRequest(format!("unknown content kind '{}'", segment)))
}

/// Handler for GET /admin/stats
pub async fn stats_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<AdminStats>> {
    let stats = state.service.fetch_admin_stats(&actor).await?;
    Ok(Json(stats))
}

/// Handler for POST /admin/content/:kind/:id/approve
pub async fn approve_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<ContentActionResponse>> {
    let kind = parse_kind(&kind)?;
    let item = state.service.approve(&actor, kind, &id).await?;
    Ok(Json(ContentActionResponse::new(item)))
}

/// Handler for POST /admin/content/:kind/:id/reject
pub async fn reject_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<ContentActionResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AdminError::InvalidRequest(error_msg));
    }

    let kind = parse_kind(&kind)?;
    let item = state
        .service
        .reject(&actor, kind, &id, req.reason.as_deref())
        .await?;
    Ok(Json(ContentActionResponse::new(item)))
}

/// Handler for POST /admin/users/:id/ban
pub async fn ban_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(user_id): Path<String>,
    Json(req): Json<BanRequest>,
) -> Result<Json<UserActionResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AdminError::InvalidRequest(error_msg));
    }

    let profile = state
        .service
        .ban(&actor, &user_id, req.reason.as_deref())
        .await?;
    Ok(Json(UserActionResponse::new(
        format!("User '{}' banned", user_id),
        profile,
    )))
}

/// Handler for POST /admin/users/:id/unban
pub async fn unban_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(user_id): Path<String>,
) -> Result<Json<UserActionResponse>> {
    let profile = state.service.unban(&actor, &user_id).await?;
    Ok(Json(UserActionResponse::new(
        format!("User '{}' unbanned", user_id),
        profile,
    )))
}

/// Handler for PUT /admin/users/:id/role
pub async fn role_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(user_id): Path<String>,
    Json(req): Json<RoleChangeRequest>,
) -> Result<Json<UserActionResponse>> {
    let profile = state.service.change_role(&actor, &user_id, req.role).await?;
    Ok(Json(UserActionResponse::new(
        format!("User '{}' is now {}", user_id, profile.role),
        profile,
    )))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.cache().read().await.stats();
    Json(stats.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
