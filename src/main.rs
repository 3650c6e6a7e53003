//! Book Review API server
//!
//! Serves the book and review REST API with a cache-aside read path.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_review::api::{create_router, AppState};
use book_review::cache::{CacheStore, MemoryBackend};
use book_review::config::{CacheBackendKind, Config};
use book_review::store::MemoryStore;
use book_review::{spawn_cleanup_task, Catalog};

/// Main entry point for the Book Review API server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the configured cache backend (falling back to no cache)
/// 4. Start background cache cleanup task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_review=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Book Review API");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_backend={:?}, cache_ttl={}s, stats_cache_ttl={}s, port={}",
        config.cache_backend, config.cache_ttl, config.stats_cache_ttl, config.server_port
    );

    let cache = build_cache(&config).await;
    info!(enabled = cache.is_enabled(), "Cache initialized");

    let cleanup_handle = spawn_cleanup_task(cache.clone(), config.cleanup_interval);

    let catalog = Catalog::from_config(Arc::new(MemoryStore::new()), cache, &config);
    let app = create_router(AppState::new(catalog));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the cache store for the configured backend.
///
/// An unusable backend never stops startup: the service runs uncached.
async fn build_cache(config: &Config) -> CacheStore {
    let ttl = std::time::Duration::from_secs(config.cache_ttl);

    match config.cache_backend {
        CacheBackendKind::Memory => {
            CacheStore::new(Arc::new(MemoryBackend::new()), ttl, config.cache_timeout())
        }
        CacheBackendKind::Redis => connect_redis(config, ttl).await,
        CacheBackendKind::Disabled => CacheStore::disabled(),
    }
}

#[cfg(feature = "redis")]
async fn connect_redis(config: &Config, ttl: std::time::Duration) -> CacheStore {
    use book_review::cache::RedisBackend;

    match RedisBackend::connect(&config.redis_url, config.cache_timeout() * 10).await {
        Ok(backend) => {
            info!(url = %config.redis_url, "Connected to Redis");
            CacheStore::new(Arc::new(backend), ttl, config.cache_timeout())
        }
        Err(err) => {
            warn!(error = %err, "Redis unavailable, running without cache");
            CacheStore::disabled()
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn connect_redis(_config: &Config, _ttl: std::time::Duration) -> CacheStore {
    warn!("Built without the `redis` feature, running without cache");
    CacheStore::disabled()
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
