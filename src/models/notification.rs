//! Notification records written to a user's inbox after moderation actions.

use serde::{Deserialize, Serialize};

use crate::models::{ContentItem, Role};

/// Notification categories understood by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PublicationApproved,
    PublicationRejected,
    AccountBanned,
    AccountUnbanned,
    RoleChanged,
}

/// A single inbox record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Item or profile the notification is about
    pub related_id: Option<String>,
}

impl Notification {
    pub fn publication_approved(item: &ContentItem) -> Self {
        Self {
            user_id: item.owner_id.clone(),
            kind: NotificationKind::PublicationApproved,
            title: "Publication approved".to_string(),
            message: format!("Your {} \"{}\" is now published.", item.kind, item.title),
            related_id: Some(item.id.clone()),
        }
    }

    pub fn publication_rejected(item: &ContentItem, reason: Option<&str>) -> Self {
        let message = match reason {
            Some(reason) => format!(
                "Your {} \"{}\" was rejected: {}",
                item.kind, item.title, reason
            ),
            None => format!("Your {} \"{}\" was rejected.", item.kind, item.title),
        };

        Self {
            user_id: item.owner_id.clone(),
            kind: NotificationKind::PublicationRejected,
            title: "Publication rejected".to_string(),
            message,
            related_id: Some(item.id.clone()),
        }
    }

    pub fn account_banned(user_id: &str, reason: Option<&str>) -> Self {
        Self {
            user_id: user_id.to_string(),
            kind: NotificationKind::AccountBanned,
            title: "Account suspended".to_string(),
            message: match reason {
                Some(reason) => format!("Your account has been suspended: {}", reason),
                None => "Your account has been suspended.".to_string(),
            },
            related_id: Some(user_id.to_string()),
        }
    }

    pub fn account_unbanned(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            kind: NotificationKind::AccountUnbanned,
            title: "Account restored".to_string(),
            message: "Your account has been restored.".to_string(),
            related_id: Some(user_id.to_string()),
        }
    }

    pub fn role_changed(user_id: &str, role: Role) -> Self {
        Self {
            user_id: user_id.to_string(),
            kind: NotificationKind::RoleChanged,
            title: "Role updated".to_string(),
            message: format!("Your role is now {}.", role),
            related_id: Some(user_id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentKind;

    #[test]
    fn test_serialized_shape() {
        let item = ContentItem::pending(ContentKind::Event, "E1", "U1", "Jazz night");
        let json = serde_json::to_value(Notification::publication_approved(&item)).unwrap();

        assert_eq!(json["user_id"], "U1");
        assert_eq!(json["type"], "publication_approved");
        assert_eq!(json["related_id"], "E1");
    }

    #[test]
    fn test_rejection_message_carries_reason() {
        let item = ContentItem::pending(ContentKind::Business, "B1", "U2", "Bakery");
        let n = Notification::publication_rejected(&item, Some("missing address"));

        assert_eq!(n.kind, NotificationKind::PublicationRejected);
        assert!(n.message.contains("missing address"));
        assert!(n.message.contains("business"));
    }
}
