//! Cache Backend Trait
//!
//! The seam between the cache store and whatever physically holds entries.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Raw key/value operations a cache backend must provide.
///
/// Backends deal in serialized strings only; encoding, timeouts and the
/// fail-open policy live in [`CacheStore`](super::CacheStore).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Returns the stored value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Removes one key. Returns how many entries were removed.
    async fn delete_key(&self, key: &str) -> Result<u64, CacheError>;

    /// Removes every key starting with `prefix`. Returns how many entries were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError>;

    /// Physically drops expired entries. Backends with native expiry need not override.
    async fn purge_expired(&self) -> Result<u64, CacheError> {
        Ok(0)
    }
}
