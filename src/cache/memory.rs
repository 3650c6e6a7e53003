//! In-Memory Cache Backend
//!
//! A flat expiring map. Expired entries are invisible to readers immediately
//! and physically removed by the cleanup task.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheBackend, CacheEntry};
use crate::error::CacheError;

// == Memory Backend ==
/// Process-local cache backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physically present entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry::new(value, ttl);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete_key(&self, key: &str) -> Result<u64, CacheError> {
        let removed = self.entries.write().await.remove(key);
        Ok(u64::from(removed.is_some()))
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        Ok((before - entries.len()) as u64)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_set_and_get() {
        let backend = MemoryBackend::new();

        backend.set("key1", "value1".to_string(), TTL).await.unwrap();

        assert_eq!(backend.get("key1").await.unwrap(), Some("value1".to_string()));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_entry() {
        let backend = MemoryBackend::new();

        backend.set("key1", "value1".to_string(), TTL).await.unwrap();
        backend.set("key1", "value2".to_string(), TTL).await.unwrap();

        assert_eq!(backend.get("key1").await.unwrap(), Some("value2".to_string()));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent_before_purge() {
        let backend = MemoryBackend::new();

        backend
            .set("short", "value".to_string(), Duration::from_millis(30))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(backend.get("short").await.unwrap(), None);
        assert_eq!(backend.len().await, 1, "still physically present");
    }

    #[tokio::test]
    async fn test_delete_key() {
        let backend = MemoryBackend::new();

        backend.set("key1", "value1".to_string(), TTL).await.unwrap();

        assert_eq!(backend.delete_key("key1").await.unwrap(), 1);
        assert_eq!(backend.delete_key("key1").await.unwrap(), 0);
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_prefix_only_touches_matching_keys() {
        let backend = MemoryBackend::new();

        backend.set("books:page=1", "a".to_string(), TTL).await.unwrap();
        backend.set("books:page=2", "b".to_string(), TTL).await.unwrap();
        backend.set("book:1:stats", "c".to_string(), TTL).await.unwrap();

        assert_eq!(backend.delete_prefix("books:").await.unwrap(), 2);
        assert_eq!(backend.get("books:page=1").await.unwrap(), None);
        assert_eq!(backend.get("book:1:stats").await.unwrap(), Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let backend = MemoryBackend::new();

        backend
            .set("short", "value".to_string(), Duration::from_millis(30))
            .await
            .unwrap();
        backend.set("long", "value".to_string(), TTL).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(backend.purge_expired().await.unwrap(), 1);
        assert_eq!(backend.len().await, 1);
        assert!(backend.get("long").await.unwrap().is_some());
    }
}
