//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which cache backend the service should run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// Process-local expiring map
    Memory,
    /// External Redis server (requires the `redis` feature)
    Redis,
    /// No cache at all, every lookup is a miss
    Disabled,
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            "none" | "disabled" | "off" => Ok(Self::Disabled),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache backend selection
    pub cache_backend: CacheBackendKind,
    /// Redis connection URL, used when `cache_backend` is `Redis`
    pub redis_url: String,
    /// TTL in seconds for listing and entity entries
    pub cache_ttl: u64,
    /// TTL in seconds for review statistics entries
    pub stats_cache_ttl: u64,
    /// Upper bound in milliseconds for a single cache backend call
    pub cache_timeout_ms: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Page size used when the caller gives none
    pub default_page_size: u32,
    /// Largest page size a caller may request
    pub max_page_size: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `CACHE_BACKEND` - `memory`, `redis` or `none` (default: memory)
    /// - `REDIS_URL` - Redis URL (default: redis://localhost:6379/0)
    /// - `CACHE_TTL` - Listing/entity TTL in seconds (default: 300)
    /// - `STATS_CACHE_TTL` - Stats TTL in seconds (default: 60)
    /// - `CACHE_TIMEOUT_MS` - Cache call bound in milliseconds (default: 200)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `DEFAULT_PAGE_SIZE` - Default page size (default: 10)
    /// - `MAX_PAGE_SIZE` - Maximum page size (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cache_backend: env_or("CACHE_BACKEND", defaults.cache_backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            stats_cache_ttl: env_or("STATS_CACHE_TTL", defaults.stats_cache_ttl),
            cache_timeout_ms: env_or("CACHE_TIMEOUT_MS", defaults.cache_timeout_ms),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            default_page_size: env_or("DEFAULT_PAGE_SIZE", defaults.default_page_size),
            max_page_size: env_or("MAX_PAGE_SIZE", defaults.max_page_size),
        }
    }

    /// Cache backend call bound as a Duration.
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}

/// Parses an environment variable, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            cache_backend: CacheBackendKind::Memory,
            redis_url: "redis://localhost:6379/0".to_string(),
            cache_ttl: 300,
            stats_cache_ttl: 60,
            cache_timeout_ms: 200,
            cleanup_interval: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.cache_backend, CacheBackendKind::Memory);
        assert_eq!(config.cache_ttl, 300);
        assert_eq!(config.stats_cache_ttl, 60);
        assert_eq!(config.cache_timeout(), Duration::from_millis(200));
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("memory".parse::<CacheBackendKind>(), Ok(CacheBackendKind::Memory));
        assert_eq!(" Redis ".parse::<CacheBackendKind>(), Ok(CacheBackendKind::Redis));
        assert_eq!("none".parse::<CacheBackendKind>(), Ok(CacheBackendKind::Disabled));
        assert!("memcached".parse::<CacheBackendKind>().is_err());
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("BOOK_REVIEW_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("BOOK_REVIEW_TEST_GARBAGE", 7u64), 7);
        env::remove_var("BOOK_REVIEW_TEST_GARBAGE");
        assert_eq!(env_or("BOOK_REVIEW_TEST_GARBAGE", 7u64), 7);
    }
}
