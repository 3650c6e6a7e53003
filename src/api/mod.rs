//! API Module
//!
//! HTTP handlers and routing for the book review REST API.
//!
//! # Endpoints
//! - `GET|POST /api/books` - List (paged, searchable) or create books
//! - `GET|PUT|DELETE /api/books/:id` - Read, update or delete a book
//! - `GET|POST /api/books/:id/reviews` - List (paged, filterable) or create reviews
//! - `GET /api/books/:id/reviews/stats` - Rating statistics for a book
//! - `GET|PUT|DELETE /api/reviews/:id` - Read, update or delete a review
//! - `GET /api/cache/stats` - Cache counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
