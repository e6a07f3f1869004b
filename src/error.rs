//! Error types for the admin core
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::models::{ContentStatus, ErrorResponse};

// == Admin Error Enum ==
/// Failures surfaced to callers of the admin operations.
///
/// Aggregate count failures and notification failures never show up here;
/// they are absorbed by the operations that hit them.
#[derive(Error, Debug)]
pub enum AdminError {
    /// No acting identity was supplied
    #[error("Missing acting identity")]
    MissingIdentity,

    /// The actor lacks the role the operation requires
    #[error("Identity '{0}' is not allowed to perform this action")]
    Unauthorized(String),

    /// The actor has the role but the target is off limits
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// The item is not in a state the action applies to
    #[error("Cannot move '{id}' from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: ContentStatus,
        to: ContentStatus,
    },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A backend read or write needed by the operation failed
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl AdminError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::MissingIdentity => StatusCode::UNAUTHORIZED,
            AdminError::Unauthorized(_) | AdminError::Forbidden(_) => StatusCode::FORBIDDEN,
            AdminError::NotFound { .. } => StatusCode::NOT_FOUND,
            AdminError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AdminError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::Backend(BackendError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            AdminError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_error_status_codes() {
        let cases = vec![
            (AdminError::MissingIdentity, StatusCode::UNAUTHORIZED),
            (AdminError::Unauthorized("u1".into()), StatusCode::FORBIDDEN),
            (AdminError::Forbidden("self".into()), StatusCode::FORBIDDEN),
            (
                AdminError::NotFound {
                    entity: "event",
                    id: "E9".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                AdminError::InvalidTransition {
                    id: "E1".into(),
                    from: ContentStatus::Published,
                    to: ContentStatus::Rejected,
                },
                StatusCode::CONFLICT,
            ),
            (AdminError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                AdminError::Backend(BackendError::Request("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AdminError::Backend(BackendError::Timeout { timeout_ms: 10 }),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = AdminError::Unauthorized("u1".into()).into_response();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.contains("application/json"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["error"].as_str().unwrap().contains("u1"));
    }
}
