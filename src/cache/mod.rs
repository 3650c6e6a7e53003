//! Cache Module
//!
//! Fail-open, TTL-based cache sitting in front of the data store.
//! Keys come from [`keys`]; storage is pluggable through [`CacheBackend`].

mod backend;
mod entry;
mod keys;
mod memory;
#[cfg(feature = "redis")]
mod redis_backend;
mod stats;
mod store;


// Re-export public types
pub use backend::CacheBackend;
pub use entry::CacheEntry;
pub use keys::{CacheKey, KeyFamily};
pub use memory::MemoryBackend;
#[cfg(feature = "redis")]
pub use redis_backend::RedisBackend;
pub use stats::CacheStats;
pub use store::{CacheLookup, CacheStore};
