//! Review reads and writes.
//!
//! Review writes touch only the owning book's review pages and stats.

use tracing::info;

use super::{store_failure, validated, Catalog};
use crate::cache::{CacheKey, CacheLookup, KeyFamily};
use crate::error::{Result, ServiceError};
use crate::models::review::check_rating;
use crate::models::{NewReview, Review, ReviewUpdate};
use crate::pagination::Page;
use crate::store::{ReviewFilter, StoreError};

impl Catalog {
    // == List Reviews ==
    /// Lists a book's reviews, newest first, optionally only those rated at
    /// least `min_rating`.
    ///
    /// The book's existence is only checked on a miss; its cached pages are
    /// dropped when it is deleted.
    pub async fn list_reviews(
        &self,
        book_id: i64,
        page: Option<i64>,
        size: Option<i64>,
        min_rating: Option<f64>,
    ) -> Result<Page<Review>> {
        if let Some(min_rating) = min_rating {
            validated(check_rating(min_rating).map(|m| format!("min_rating: {}", m)))?;
        }

        let request = self.paginator.request(page, size);
        let filter = ReviewFilter { min_rating };
        let key = CacheKey::review_list(book_id, &request, &filter);

        match self.cache.get::<Page<Review>>(&key).await {
            CacheLookup::Hit(page) => return Ok(page),
            CacheLookup::Miss | CacheLookup::Unavailable(_) => {}
        }

        self.ensure_book(book_id).await?;

        let (rows, total) = self
            .store
            .query_reviews(book_id, &filter, request.offset(), request.limit())
            .await
            .map_err(store_failure("query_reviews"))?;

        let page = Page::assemble(rows, &request, total);
        self.cache.set(&key, &page, None).await;
        Ok(page)
    }

    // == Get Review ==
    pub async fn get_review(&self, id: i64) -> Result<Review> {
        let key = CacheKey::review(id);

        match self.cache.get::<Review>(&key).await {
            CacheLookup::Hit(review) => return Ok(review),
            CacheLookup::Miss | CacheLookup::Unavailable(_) => {}
        }

        let review = self
            .store
            .find_review(id)
            .await
            .map_err(store_failure("find_review"))?
            .ok_or_else(|| ServiceError::from(StoreError::review_not_found(id)))?;

        self.cache.set(&key, &review, None).await;
        Ok(review)
    }

    // == Create Review ==
    pub async fn create_review(&self, book_id: i64, fields: NewReview) -> Result<Review> {
        validated(fields.validate())?;
        self.ensure_book(book_id).await?;

        let review = self
            .store
            .insert_review(book_id, fields.normalized())
            .await
            .map_err(store_failure("insert_review"))?;
        info!(review_id = review.id, book_id, "created review");

        self.invalidate(
            &[KeyFamily::BookReviews(book_id), KeyFamily::BookStats(book_id)],
            &[],
        )
        .await;
        Ok(review)
    }

    // == Update Review ==
    pub async fn update_review(&self, id: i64, patch: ReviewUpdate) -> Result<Review> {
        validated(patch.validate())?;

        let review = self
            .store
            .update_review(id, patch.normalized())
            .await
            .map_err(store_failure("update_review"))?;
        info!(review_id = id, book_id = review.book_id, "updated review");

        self.invalidate_review(&review).await;
        Ok(review)
    }

    // == Delete Review ==
    pub async fn delete_review(&self, id: i64) -> Result<()> {
        let review = self
            .store
            .delete_review(id)
            .await
            .map_err(store_failure("delete_review"))?;
        info!(review_id = id, book_id = review.book_id, "deleted review");

        self.invalidate_review(&review).await;
        Ok(())
    }

    async fn invalidate_review(&self, review: &Review) {
        self.invalidate(
            &[
                KeyFamily::BookReviews(review.book_id),
                KeyFamily::BookStats(review.book_id),
            ],
            &[CacheKey::review(review.id)],
        )
        .await;
    }

    /// Fails with `NotFound` unless the book exists.
    pub(super) async fn ensure_book(&self, book_id: i64) -> Result<()> {
        let exists = self
            .store
            .book_exists(book_id)
            .await
            .map_err(store_failure("book_exists"))?;
        if exists {
            Ok(())
        } else {
            Err(StoreError::book_not_found(book_id).into())
        }
    }
}
