//! Book Review API - books and reviews behind a fail-open, TTL-based read cache
//!
//! Reads go cache-first and fall back to the data store; writes persist and
//! then invalidate the affected key families.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use catalog::Catalog;
pub use config::Config;
pub use error::ServiceError;
pub use tasks::spawn_cleanup_task;
