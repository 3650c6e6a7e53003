//! API Handlers
//!
//! Thin adapters between HTTP and the [`Catalog`]. Every handler returns
//! `Result<_, ServiceError>`; the error type renders its own status code.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::{
    Book, BookUpdate, CacheStatsResponse, HealthResponse, ListBooksParams, ListReviewsParams,
    NewBook, NewReview, Review, ReviewStats, ReviewUpdate,
};
use crate::pagination::Page;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

// == Books ==

/// Handler for GET /api/books
pub async fn list_books_handler(
    State(state): State<AppState>,
    Query(params): Query<ListBooksParams>,
) -> Result<Json<Page<Book>>> {
    let page = state
        .catalog
        .list_books(params.page, params.size, params.search.as_deref())
        .await?;
    Ok(Json(page))
}

/// Handler for POST /api/books
pub async fn create_book_handler(
    State(state): State<AppState>,
    Json(fields): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>)> {
    let book = state.catalog.create_book(fields).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Handler for GET /api/books/:id
pub async fn get_book_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Book>> {
    Ok(Json(state.catalog.get_book(id).await?))
}

/// Handler for PUT /api/books/:id
pub async fn update_book_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<BookUpdate>,
) -> Result<Json<Book>> {
    Ok(Json(state.catalog.update_book(id, patch).await?))
}

/// Handler for DELETE /api/books/:id
///
/// Deletes the book's reviews with it.
pub async fn delete_book_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// == Reviews ==

/// Handler for GET /api/books/:id/reviews
pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    Query(params): Query<ListReviewsParams>,
) -> Result<Json<Page<Review>>> {
    let page = state
        .catalog
        .list_reviews(book_id, params.page, params.size, params.min_rating)
        .await?;
    Ok(Json(page))
}

/// Handler for POST /api/books/:id/reviews
pub async fn create_review_handler(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    Json(fields): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = state.catalog.create_review(book_id, fields).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Handler for GET /api/books/:id/reviews/stats
pub async fn review_stats_handler(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Json<ReviewStats>> {
    Ok(Json(state.catalog.review_stats(book_id).await?))
}

/// Handler for GET /api/reviews/:id
pub async fn get_review_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Review>> {
    Ok(Json(state.catalog.get_review(id).await?))
}

/// Handler for PUT /api/reviews/:id
pub async fn update_review_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ReviewUpdate>,
) -> Result<Json<Review>> {
    Ok(Json(state.catalog.update_review(id, patch).await?))
}

/// Handler for DELETE /api/reviews/:id
pub async fn delete_review_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.catalog.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// == Service ==

/// Handler for GET /api/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(state.catalog.cache().stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
