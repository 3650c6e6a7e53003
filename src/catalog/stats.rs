//! Review statistics, cache-aside with their own (shorter) TTL.

use super::{store_failure, Catalog};
use crate::cache::{CacheKey, CacheLookup};
use crate::error::Result;
use crate::models::ReviewStats;

impl Catalog {
    // == Review Stats ==
    /// Count, rounded average, min and max rating over a book's reviews.
    pub async fn review_stats(&self, book_id: i64) -> Result<ReviewStats> {
        let key = CacheKey::review_stats(book_id);

        match self.cache.get::<ReviewStats>(&key).await {
            CacheLookup::Hit(stats) => return Ok(stats),
            CacheLookup::Miss | CacheLookup::Unavailable(_) => {}
        }

        self.ensure_book(book_id).await?;

        let aggregate = self
            .store
            .aggregate_review_stats(book_id)
            .await
            .map_err(store_failure("aggregate_review_stats"))?;

        let stats = ReviewStats::from_aggregate(book_id, aggregate);
        self.cache.set(&key, &stats, Some(self.stats_ttl)).await;
        Ok(stats)
    }
}
