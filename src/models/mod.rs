//! Domain records and the DTOs used by the admin API.

pub mod content;
pub mod notification;
pub mod requests;
pub mod responses;
pub mod stats;
pub mod user;

// Re-export commonly used types
pub use content::{ContentItem, ContentKind, ContentStatus};
pub use notification::{Notification, NotificationKind};
pub use requests::{BanRequest, RejectRequest, RoleChangeRequest};
pub use responses::{
    CacheStatsResponse, ContentActionResponse, ErrorResponse, HealthResponse, UserActionResponse,
};
pub use stats::{AdminStats, Metric, StatsCounts};
pub use user::{Permission, Profile, ProfileUpdate, Role};
