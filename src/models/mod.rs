//! Domain entities and request/response models
//!
//! Entities double as the cached payloads, so they derive both
//! `Serialize` and `Deserialize`.

pub mod book;
pub mod requests;
pub mod responses;
pub mod review;
pub mod stats;

// Re-export commonly used types
pub use book::{Book, BookUpdate, NewBook};
pub use requests::{ListBooksParams, ListReviewsParams};
pub use responses::{CacheStatsResponse, ErrorResponse, HealthResponse};
pub use review::{NewReview, Review, ReviewUpdate};
pub use stats::{ReviewAggregate, ReviewStats};
