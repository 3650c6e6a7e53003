//! In-Memory Data Store
//!
//! Two tables behind one lock, with the constraints a relational schema would
//! enforce: id sequences, unique isbn, review → book foreign key with cascade
//! delete, and a rating range check.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::review::{check_rating, round_rating};
use crate::models::{Book, BookUpdate, NewBook, NewReview, Review, ReviewAggregate, ReviewUpdate};
use crate::store::{BookFilter, DataStore, ReviewFilter, StoreError};

#[derive(Debug, Default)]
struct Tables {
    books: BTreeMap<i64, Book>,
    reviews: BTreeMap<i64, Review>,
    last_book_id: i64,
    last_review_id: i64,
}

impl Tables {
    fn isbn_taken(&self, isbn: &str, except: Option<i64>) -> bool {
        self.books
            .values()
            .any(|b| Some(b.id) != except && b.isbn.as_deref() == Some(isbn))
    }
}

/// Process-local implementation of [`DataStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn window<T>(rows: Vec<T>, offset: u64, limit: u64) -> Vec<T> {
    rows.into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect()
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn query_books(
        &self,
        filter: &BookFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Book>, u64), StoreError> {
        let tables = self.tables.read().await;
        let matching: Vec<Book> = tables
            .books
            .values()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        Ok((window(matching, offset, limit), total))
    }

    async fn find_book(&self, id: i64) -> Result<Option<Book>, StoreError> {
        Ok(self.tables.read().await.books.get(&id).cloned())
    }

    async fn book_exists(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.books.contains_key(&id))
    }

    async fn insert_book(&self, fields: NewBook) -> Result<Book, StoreError> {
        let mut tables = self.tables.write().await;

        if let Some(isbn) = fields.isbn.as_deref() {
            if tables.isbn_taken(isbn, None) {
                return Err(StoreError::Conflict(format!(
                    "Book with ISBN {} already exists",
                    isbn
                )));
            }
        }

        tables.last_book_id += 1;
        let now = Utc::now();
        let book = Book {
            id: tables.last_book_id,
            title: fields.title,
            author: fields.author,
            isbn: fields.isbn,
            description: fields.description,
            publication_year: fields.publication_year,
            created_at: now,
            updated_at: now,
        };
        tables.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update_book(&self, id: i64, patch: BookUpdate) -> Result<Book, StoreError> {
        let mut tables = self.tables.write().await;

        if let Some(isbn) = patch.isbn.as_deref() {
            if tables.isbn_taken(isbn, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "Book with ISBN {} already exists",
                    isbn
                )));
            }
        }

        let book = tables
            .books
            .get_mut(&id)
            .ok_or_else(|| StoreError::book_not_found(id))?;
        patch.apply_to(book);
        book.updated_at = Utc::now();
        Ok(book.clone())
    }

    async fn delete_book(&self, id: i64) -> Result<Vec<i64>, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.books.remove(&id).is_none() {
            return Err(StoreError::book_not_found(id));
        }

        let cascaded: Vec<i64> = tables
            .reviews
            .values()
            .filter(|r| r.book_id == id)
            .map(|r| r.id)
            .collect();
        for review_id in &cascaded {
            tables.reviews.remove(review_id);
        }
        Ok(cascaded)
    }

    async fn query_reviews(
        &self,
        book_id: i64,
        filter: &ReviewFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Review>, u64), StoreError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| r.book_id == book_id && filter.matches(r))
            .cloned()
            .collect();
        // newest first
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        let total = matching.len() as u64;
        Ok((window(matching, offset, limit), total))
    }

    async fn find_review(&self, id: i64) -> Result<Option<Review>, StoreError> {
        Ok(self.tables.read().await.reviews.get(&id).cloned())
    }

    async fn insert_review(&self, book_id: i64, fields: NewReview) -> Result<Review, StoreError> {
        let rating = fields
            .rating
            .ok_or_else(|| StoreError::Invalid("rating is required".to_string()))?;
        if let Some(message) = check_rating(rating) {
            return Err(StoreError::Invalid(message));
        }

        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&book_id) {
            return Err(StoreError::book_not_found(book_id));
        }

        tables.last_review_id += 1;
        let now = Utc::now();
        let review = Review {
            id: tables.last_review_id,
            book_id,
            reviewer_name: fields.reviewer_name,
            reviewer_email: fields.reviewer_email,
            rating: round_rating(rating),
            review_text: fields.review_text,
            created_at: now,
            updated_at: now,
        };
        tables.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn update_review(&self, id: i64, patch: ReviewUpdate) -> Result<Review, StoreError> {
        if let Some(message) = patch.rating.and_then(check_rating) {
            return Err(StoreError::Invalid(message));
        }

        let mut tables = self.tables.write().await;
        let review = tables
            .reviews
            .get_mut(&id)
            .ok_or_else(|| StoreError::review_not_found(id))?;
        patch.apply_to(review);
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn delete_review(&self, id: i64) -> Result<Review, StoreError> {
        self.tables
            .write()
            .await
            .reviews
            .remove(&id)
            .ok_or_else(|| StoreError::review_not_found(id))
    }

    async fn aggregate_review_stats(&self, book_id: i64) -> Result<ReviewAggregate, StoreError> {
        let tables = self.tables.read().await;
        let mut aggregate = ReviewAggregate::default();
        for review in tables.reviews.values().filter(|r| r.book_id == book_id) {
            aggregate.push(review.rating);
        }
        Ok(aggregate)
    }
}
