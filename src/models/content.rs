//! Moderatable content: events ("panoramas") and businesses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::Table;
use crate::cache::Namespace;

// == Content Kind ==
/// Which directory a moderatable item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Event,
    Business,
}

impl ContentKind {
    /// Backend table holding this kind of item.
    pub fn table(&self) -> Table {
        match self {
            ContentKind::Event => Table::Panoramas,
            ContentKind::Business => Table::Businesses,
        }
    }

    /// Cache namespace for listings of this kind.
    pub fn namespace(&self) -> Namespace {
        match self {
            ContentKind::Event => Namespace::Panoramas,
            ContentKind::Business => Namespace::Businesses,
        }
    }

    /// Parses the plural form used in URLs (`events`, `businesses`).
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "events" | "panoramas" => Some(ContentKind::Event),
            "businesses" => Some(ContentKind::Business),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Event => "event",
            ContentKind::Business => "business",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Content Status ==
/// Moderation lifecycle of an item.
///
/// `Pending` is the only state with outgoing admin transitions; published and
/// rejected items only change through re-submission by their author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Pending,
    Published,
    Rejected,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Pending => "pending",
            ContentStatus::Published => "published",
            ContentStatus::Rejected => "rejected",
        }
    }

    /// Whether a moderator may move an item from `self` to `next`.
    pub fn can_transition_to(&self, next: ContentStatus) -> bool {
        matches!(
            (self, next),
            (ContentStatus::Pending, ContentStatus::Published)
                | (ContentStatus::Pending, ContentStatus::Rejected)
        )
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Content Item ==
/// An event or business record subject to moderation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub kind: ContentKind,
    /// Author, recipient of moderation notifications
    pub owner_id: String,
    pub title: String,
    pub status: ContentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ContentItem {
    /// A freshly submitted item awaiting review.
    pub fn pending(
        kind: ContentKind,
        id: impl Into<String>,
        owner_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            owner_id: owner_id.into(),
            title: title.into(),
            status: ContentStatus::Pending,
            rejection_reason: None,
        }
    }

    pub fn with_status(mut self, status: ContentStatus) -> Self {
        self.status = status;
        self
    }
}
