//! Catalog Module
//!
//! The cache-aside controller. Reads check the cache, fall through to the
//! data store on a miss (or on any cache failure) and repopulate. Writes
//! validate, persist, then invalidate exactly the key families they affect.
//!
//! No lock is held across the cache-then-store sequence. Two concurrent misses
//! may both hit the store and both populate; a populate racing an
//! invalidation may leave one stale entry alive until its TTL runs out.

mod books;
mod reviews;
mod stats;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::cache::{CacheKey, CacheStore, KeyFamily};
use crate::config::Config;
use crate::error::ServiceError;
use crate::pagination::Paginator;
use crate::store::{DataStore, StoreError};

/// Read and write entry point for books, reviews and review statistics.
pub struct Catalog {
    store: Arc<dyn DataStore>,
    cache: CacheStore,
    paginator: Paginator,
    stats_ttl: Duration,
}

impl Catalog {
    /// Creates a catalog. Stats entries use the cache's default TTL until
    /// [`with_stats_ttl`](Self::with_stats_ttl) says otherwise.
    pub fn new(store: Arc<dyn DataStore>, cache: CacheStore, paginator: Paginator) -> Self {
        let stats_ttl = cache.default_ttl();
        Self {
            store,
            cache,
            paginator,
            stats_ttl,
        }
    }

    /// Creates a catalog with paging limits and stats TTL taken from `config`.
    pub fn from_config(store: Arc<dyn DataStore>, cache: CacheStore, config: &Config) -> Self {
        Self::new(
            store,
            cache,
            Paginator::new(config.default_page_size, config.max_page_size),
        )
        .with_stats_ttl(Duration::from_secs(config.stats_cache_ttl))
    }

    pub fn with_stats_ttl(mut self, ttl: Duration) -> Self {
        self.stats_ttl = ttl;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    /// Drops every affected family and key after a successful write.
    ///
    /// Failures are already logged by the cache store; they never undo or
    /// fail the write.
    async fn invalidate(&self, families: &[KeyFamily], keys: &[CacheKey]) {
        if !self.cache.is_enabled() {
            return;
        }

        let mut complete = true;
        for family in families {
            complete &= self.cache.invalidate(*family).await;
        }
        for key in keys {
            complete &= self.cache.delete_key(key).await;
        }

        if !complete {
            warn!(
                ?families,
                "cache invalidation incomplete, stale entries may be served until they expire"
            );
        }
    }
}

/// Maps a store error for `operation` into the service taxonomy, logging outages.
fn store_failure(operation: &'static str) -> impl FnOnce(StoreError) -> ServiceError {
    move |err| {
        if let StoreError::Unavailable(_) = &err {
            error!(operation, error = %err, "data store unavailable");
        }
        ServiceError::from(err)
    }
}

/// Turns a model validation message into a service error.
fn validated(message: Option<String>) -> Result<(), ServiceError> {
    match message {
        Some(message) => Err(ServiceError::Validation(message)),
        None => Ok(()),
    }
}
