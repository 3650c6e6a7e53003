//! Cache Store Module
//!
//! Typed, fail-open front over a [`CacheBackend`]. Every backend call is
//! bounded by a timeout; any failure is logged and reported as
//! [`CacheLookup::Unavailable`] (reads) or `false` (writes), never raised.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::stats::CacheCounters;
use crate::cache::{CacheBackend, CacheKey, CacheStats, KeyFamily};
use crate::error::CacheError;

// == Cache Lookup ==
/// Outcome of a cache read.
///
/// Callers treat `Miss` and `Unavailable` the same way: go to the data store.
#[derive(Debug)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    Unavailable(CacheError),
}

impl<T> CacheLookup<T> {
    /// Collapses the lookup into the cached value, if any.
    pub fn into_hit(self) -> Option<T> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            CacheLookup::Miss | CacheLookup::Unavailable(_) => None,
        }
    }
}

// == Cache Store ==
/// Shared handle to the service cache. Cloning is cheap; clones share the
/// backend and counters.
#[derive(Clone)]
pub struct CacheStore {
    backend: Option<Arc<dyn CacheBackend>>,
    default_ttl: Duration,
    timeout: Duration,
    counters: Arc<CacheCounters>,
}

impl CacheStore {
    // == Constructors ==
    /// Creates a store over `backend`.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied when `set` is given none
    /// * `timeout` - Upper bound for every single backend call
    pub fn new(backend: Arc<dyn CacheBackend>, default_ttl: Duration, timeout: Duration) -> Self {
        Self {
            backend: Some(backend),
            default_ttl,
            timeout,
            counters: Arc::new(CacheCounters::default()),
        }
    }

    /// Creates a store with no backend: every lookup misses, every write is a no-op.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            default_ttl: Duration::ZERO,
            timeout: Duration::ZERO,
            counters: Arc::new(CacheCounters::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Runs a backend call under the configured timeout.
    async fn bounded<T, F>(&self, op: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    // == Get ==
    /// Looks up `key` and decodes the payload.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> CacheLookup<T> {
        let Some(backend) = &self.backend else {
            self.counters.record_miss();
            return CacheLookup::Miss;
        };

        let raw = match self.bounded(backend.get(key.as_str())).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.counters.record_miss();
                debug!(key = %key, "cache miss");
                return CacheLookup::Miss;
            }
            Err(err) => {
                self.counters.record_error();
                warn!(key = %key, backend = backend.name(), error = %err, "cache get failed, treating as miss");
                return CacheLookup::Unavailable(err);
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                self.counters.record_hit();
                debug!(key = %key, "cache hit");
                CacheLookup::Hit(value)
            }
            Err(err) => {
                self.counters.record_error();
                warn!(key = %key, error = %err, "undecodable cache entry, treating as miss");
                CacheLookup::Unavailable(CacheError::Serialization(err))
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl` (or the default TTL).
    ///
    /// Returns whether the entry was written.
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Option<Duration>) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                self.counters.record_error();
                warn!(key = %key, error = %err, "failed to encode cache payload");
                return false;
            }
        };

        let ttl = ttl.unwrap_or(self.default_ttl);
        match self.bounded(backend.set(key.as_str(), payload, ttl)).await {
            Ok(()) => {
                self.counters.record_set();
                true
            }
            Err(err) => {
                self.counters.record_error();
                warn!(key = %key, backend = backend.name(), error = %err, "cache set failed");
                false
            }
        }
    }

    // == Delete Key ==
    /// Removes a single key. Returns whether the backend call succeeded.
    pub async fn delete_key(&self, key: &CacheKey) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        match self.bounded(backend.delete_key(key.as_str())).await {
            Ok(removed) => {
                self.counters.record_invalidations(removed);
                true
            }
            Err(err) => {
                self.counters.record_error();
                warn!(key = %key, backend = backend.name(), error = %err, "cache delete failed");
                false
            }
        }
    }

    // == Delete By Prefix ==
    /// Removes every key starting with `prefix`. Returns whether the backend call succeeded.
    pub async fn delete_prefix(&self, prefix: &str) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        match self.bounded(backend.delete_prefix(prefix)).await {
            Ok(removed) => {
                self.counters.record_invalidations(removed);
                debug!(prefix, removed, "cache prefix invalidated");
                true
            }
            Err(err) => {
                self.counters.record_error();
                warn!(prefix, backend = backend.name(), error = %err, "cache prefix delete failed");
                false
            }
        }
    }

    /// Invalidates a whole key family.
    pub async fn invalidate(&self, family: KeyFamily) -> bool {
        self.delete_prefix(&family.prefix()).await
    }

    // == Purge Expired ==
    /// Physically drops expired entries. Returns the number removed.
    pub async fn purge_expired(&self) -> u64 {
        let Some(backend) = &self.backend else {
            return 0;
        };

        match self.bounded(backend.purge_expired()).await {
            Ok(removed) => removed,
            Err(err) => {
                warn!(backend = backend.name(), error = %err, "cache purge failed");
                0
            }
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.is_enabled())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryBackend;
    use async_trait::async_trait;

    const TTL: Duration = Duration::from_secs(300);
    const TIMEOUT: Duration = Duration::from_millis(100);

    fn memory_store() -> CacheStore {
        CacheStore::new(Arc::new(MemoryBackend::new()), TTL, TIMEOUT)
    }

    fn key() -> CacheKey {
        CacheKey::review(1)
    }

    /// Backend whose every call fails.
    struct BrokenBackend;

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
        async fn delete_key(&self, _key: &str) -> Result<u64, CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
        async fn delete_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
    }

    /// Backend that never answers.
    struct HangingBackend;

    #[async_trait]
    impl CacheBackend for HangingBackend {
        fn name(&self) -> &'static str {
            "hanging"
        }
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            std::future::pending().await
        }
        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            std::future::pending().await
        }
        async fn delete_key(&self, _key: &str) -> Result<u64, CacheError> {
            std::future::pending().await
        }
        async fn delete_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_set_and_get_roundtrip() {
        let store = memory_store();
        let k = key();

        assert!(store.set(&k, &vec![1, 2, 3], None).await);

        let value: Vec<i32> = store.get(&k).await.into_hit().unwrap();
        assert_eq!(value, vec![1, 2, 3]);
        assert_eq!(store.stats().hits, 1);
        assert_eq!(store.stats().sets, 1);
    }

    #[tokio::test]
    async fn test_get_miss() {
        let store = memory_store();

        assert!(matches!(store.get::<String>(&key()).await, CacheLookup::Miss));
        assert_eq!(store.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_ttl_override_expires_entry() {
        let store = memory_store();
        let k = key();

        store.set(&k, &"value", Some(Duration::from_millis(30))).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(matches!(store.get::<String>(&k).await, CacheLookup::Miss));
    }

    #[tokio::test]
    async fn test_disabled_store_always_misses() {
        let store = CacheStore::disabled();
        let k = key();

        assert!(!store.set(&k, &"value", None).await);
        assert!(matches!(store.get::<String>(&k).await, CacheLookup::Miss));
        assert!(!store.invalidate(KeyFamily::Books).await);
        assert!(!store.stats().enabled);
    }

    #[tokio::test]
    async fn test_broken_backend_fails_open() {
        let store = CacheStore::new(Arc::new(BrokenBackend), TTL, TIMEOUT);
        let k = key();

        assert!(matches!(
            store.get::<String>(&k).await,
            CacheLookup::Unavailable(CacheError::Backend(_))
        ));
        assert!(!store.set(&k, &"value", None).await);
        assert!(!store.delete_key(&k).await);
        assert!(!store.invalidate(KeyFamily::Books).await);
        assert_eq!(store.stats().errors, 4);
    }

    #[tokio::test]
    async fn test_hanging_backend_times_out() {
        let store = CacheStore::new(Arc::new(HangingBackend), TTL, Duration::from_millis(20));

        let lookup = store.get::<String>(&key()).await;
        assert!(matches!(lookup, CacheLookup::Unavailable(CacheError::Timeout(20))));
        assert!(!store.set(&key(), &"value", None).await);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_unavailable() {
        let store = memory_store();
        let k = key();

        store.set(&k, &"not a number", None).await;

        assert!(matches!(
            store.get::<u64>(&k).await,
            CacheLookup::Unavailable(CacheError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_invalidate_family_counts_removed_entries() {
        let store = memory_store();

        store.set(&CacheKey::review_stats(1), &1, None).await;
        store.set(&CacheKey::review_stats(2), &2, None).await;

        assert!(store.invalidate(KeyFamily::BookStats(1)).await);
        assert_eq!(store.stats().invalidations, 1);
        assert!(matches!(store.get::<i32>(&CacheKey::review_stats(1)).await, CacheLookup::Miss));
        assert_eq!(store.get::<i32>(&CacheKey::review_stats(2)).await.into_hit(), Some(2));
    }
}
