//! Wiring of the catalog services from configuration

use crate::cache::{CacheMetrics, CatalogCache, RedisViewCache};
use crate::config::Config;
use crate::db::PgStore;
use crate::services::{AdminService, CatalogService};
use anyhow::{Context, Result};
use cache_invalidation::{
    run_invalidation, CacheInvalidator, InvalidationReport, Namespace, RedisCacheInvalidator,
    SpawnedDispatcher, StatsCollector,
};
use db_pool::create_pool;
use prometheus::Registry;
use redis_utils::RedisPool;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Connected services sharing one pool and, when enabled, one Redis connection
pub struct CatalogApp {
    pub pool: PgPool,
    pub admin: AdminService,
    pub reader: CatalogService,
    invalidator: Option<Arc<dyn CacheInvalidator>>,
    invalidation_timeout: Duration,
}

impl CatalogApp {
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = create_pool(config.database.clone())
            .await
            .context("failed to connect to database")?;
        let store = Arc::new(PgStore::new(pool.clone()));
        let invalidation_timeout = config.cache.invalidation_timeout();

        if !config.cache.enabled {
            info!("Cache disabled, serving reads from the database only");
            return Ok(Self {
                pool,
                admin: AdminService::new(store.clone()),
                reader: CatalogService::new(store, config.media.clone()),
                invalidator: None,
                invalidation_timeout,
            });
        }

        let redis = RedisPool::connect(&config.cache.url)
            .await
            .context("failed to connect to Redis")?;
        let invalidator: Arc<dyn CacheInvalidator> =
            Arc::new(RedisCacheInvalidator::new(redis.manager()));
        let dispatcher = Arc::new(
            SpawnedDispatcher::new(invalidator.clone()).with_timeout(invalidation_timeout),
        );
        register_cache_metrics(prometheus::default_registry());
        let cache = CatalogCache::new(
            Arc::new(RedisViewCache::new(redis.manager())),
            config.cache.ttl(),
            invalidation_timeout,
        );

        Ok(Self {
            pool,
            admin: AdminService::with_invalidation(store.clone(), dispatcher),
            reader: CatalogService::with_cache(store, cache, config.media.clone()),
            invalidator: Some(invalidator),
            invalidation_timeout,
        })
    }

    /// Evict every cached view and wait for the outcome; `None` without a cache
    pub async fn evict_all(&self, origin: &str) -> Option<InvalidationReport> {
        let invalidator = self.invalidator.as_ref()?;
        let stats = StatsCollector::new();
        Some(
            run_invalidation(
                invalidator.as_ref(),
                origin,
                &Namespace::ALL,
                self.invalidation_timeout,
                &stats,
            )
            .await,
        )
    }
}

/// Expose the read-through cache counters on `registry`; repeat calls are no-ops
pub fn register_cache_metrics(registry: &Registry) {
    match CacheMetrics::register(registry) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
        Err(e) => warn!(error = %e, "Failed to register cache metrics"),
    }
}
