//! Query-string DTOs for the listing endpoints
//!
//! Values arrive raw; the catalog clamps and normalizes them.

use serde::Deserialize;

/// Query parameters for `GET /api/books`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBooksParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
    /// Case-insensitive substring over title and author
    #[serde(default)]
    pub search: Option<String>,
}

/// Query parameters for `GET /api/books/:id/reviews`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListReviewsParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
    /// Only reviews rated at least this much
    #[serde(default)]
    pub min_rating: Option<f64>,
}
