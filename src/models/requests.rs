//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::models::Role;

/// Longest reason accepted for a rejection or a ban
pub const MAX_REASON_LENGTH: usize = 500;

/// Request body for rejecting content (POST /admin/content/:kind/:id/reject)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectRequest {
    /// Shown to the author in the rejection notification
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for banning a user (POST /admin/users/:id/ban)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BanRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for changing a role (PUT /admin/users/:id/role)
#[derive(Debug, Clone, Deserialize)]
pub struct RoleChangeRequest {
    pub role: Role,
}

/// Checks an optional free-text reason.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_reason(reason: Option<&str>) -> Option<String> {
    match reason {
        Some(r) if r.trim().is_empty() => Some("Reason cannot be blank".to_string()),
        Some(r) if r.chars().count() > MAX_REASON_LENGTH => Some(format!(
            "Reason exceeds maximum length of {} characters",
            MAX_REASON_LENGTH
        )),
        _ => None,
    }
}

impl RejectRequest {
    pub fn validate(&self) -> Option<String> {
        validate_reason(self.reason.as_deref())
    }
}

impl BanRequest {
    pub fn validate(&self) -> Option<String> {
        validate_reason(self.reason.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_request_without_reason() {
        let req: RejectRequest = serde_json::from_str("{}").unwrap();
        assert!(req.reason.is_none());
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_blank_reason() {
        let req = RejectRequest {
            reason: Some("   ".to_string()),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_long_reason() {
        let req = BanRequest {
            reason: Some("x".repeat(MAX_REASON_LENGTH + 1)),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_role_change_request() {
        let req: RoleChangeRequest = serde_json::from_str(r#"{"role":"moderator"}"#).unwrap();
        assert_eq!(req.role, Role::Moderator);

        assert!(serde_json::from_str::<RoleChangeRequest>(r#"{"role":"owner"}"#).is_err());
    }
}
