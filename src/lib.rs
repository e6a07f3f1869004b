//! Panorama Admin - moderation core of the panoramas directory
//!
//! TTL-cached dashboard statistics plus the approve/reject/ban/role handlers
//! that keep that cache honest, over a hosted Postgres backend.

pub mod admin;
pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use admin::AdminService;
pub use api::AppState;
pub use config::Config;
pub use error::AdminError;
pub use tasks::spawn_cleanup_task;
