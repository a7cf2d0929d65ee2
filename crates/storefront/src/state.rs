//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;

/// Custom-domain resolutions are cached for an hour; the admin binary resets
/// rows on connect/verify/disconnect and stale entries simply age out.
const DOMAIN_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const DOMAIN_CACHE_CAPACITY: u64 = 10_000;

/// Cached result of a custom-domain lookup. Misses are cached too so an
/// unknown host doesn't hit the database on every request.
#[derive(Debug, Clone)]
pub enum DomainResolution {
    Store { slug: String },
    Unknown,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    domain_cache: Cache<String, DomainResolution>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let domain_cache = Cache::builder()
            .max_capacity(DOMAIN_CACHE_CAPACITY)
            .time_to_live(DOMAIN_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                domain_cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the custom-domain resolution cache.
    #[must_use]
    pub fn domain_cache(&self) -> &Cache<String, DomainResolution> {
        &self.inner.domain_cache
    }
}
