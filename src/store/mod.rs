//! Data Store Module
//!
//! The source of truth for books and reviews. The catalog only talks to the
//! [`DataStore`] trait; [`MemoryStore`] is the bundled implementation.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Book, BookUpdate, NewBook, NewReview, Review, ReviewAggregate, ReviewUpdate};

pub use memory::MemoryStore;

// == Store Error ==
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Referenced row does not exist
    #[error("{0}")]
    NotFound(String),
    /// A unique constraint would be violated
    #[error("{0}")]
    Conflict(String),
    /// A row constraint rejected the input
    #[error("{0}")]
    Invalid(String),
    /// The store could not be reached
    #[error("{0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn book_not_found(id: i64) -> Self {
        Self::NotFound(format!("Book with id {} not found", id))
    }

    pub fn review_not_found(id: i64) -> Self {
        Self::NotFound(format!("Review with id {} not found", id))
    }
}

// == Filters ==
/// Filter for book listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// Trimmed, lower-cased search term; never empty
    pub search: Option<String>,
}

impl BookFilter {
    /// Normalizes a raw search term. Blank input means no search.
    pub fn new(search: Option<&str>) -> Self {
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        Self { search }
    }

    /// Case-insensitive substring match over title and author.
    pub fn matches(&self, book: &Book) -> bool {
        match &self.search {
            None => true,
            Some(term) => {
                book.title.to_lowercase().contains(term) || book.author.to_lowercase().contains(term)
            }
        }
    }
}

/// Filter for review listings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReviewFilter {
    /// Only reviews rated at least this much
    pub min_rating: Option<f64>,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        self.min_rating.map_or(true, |min| review.rating >= min)
    }
}

// == Data Store Trait ==
/// Persistence operations the catalog depends on.
///
/// Listing queries return the requested rows together with the total number
/// of rows matching the filter.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn query_books(
        &self,
        filter: &BookFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Book>, u64), StoreError>;

    async fn find_book(&self, id: i64) -> Result<Option<Book>, StoreError>;

    async fn book_exists(&self, id: i64) -> Result<bool, StoreError>;

    async fn insert_book(&self, fields: NewBook) -> Result<Book, StoreError>;

    async fn update_book(&self, id: i64, patch: BookUpdate) -> Result<Book, StoreError>;

    /// Deletes a book and its reviews. Returns the ids of the deleted reviews.
    async fn delete_book(&self, id: i64) -> Result<Vec<i64>, StoreError>;

    async fn query_reviews(
        &self,
        book_id: i64,
        filter: &ReviewFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Review>, u64), StoreError>;

    async fn find_review(&self, id: i64) -> Result<Option<Review>, StoreError>;

    async fn insert_review(&self, book_id: i64, fields: NewReview) -> Result<Review, StoreError>;

    async fn update_review(&self, id: i64, patch: ReviewUpdate) -> Result<Review, StoreError>;

    /// Deletes a review and returns it as it was.
    async fn delete_review(&self, id: i64) -> Result<Review, StoreError>;

    async fn aggregate_review_stats(&self, book_id: i64) -> Result<ReviewAggregate, StoreError>;
}
