//! Read-through cache for client-facing catalog views
//!
//! `ViewCache` is the raw key/value seam (Redis in production). `CatalogCache`
//! layers JSON encoding, TTLs, metrics and error swallowing on top: a broken
//! cache degrades reads to the database, it never fails them.

mod error;
pub mod keys;
mod metrics;

pub use error::{CacheError, CacheResult};
pub use metrics::CacheMetrics;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis_utils::SharedConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[async_trait]
pub trait ViewCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>>;
    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;
    async fn del(&self, key: &str) -> CacheResult<()>;
}

/// Redis-backed view cache
#[derive(Clone)]
pub struct RedisViewCache {
    redis: SharedConnectionManager,
}

impl RedisViewCache {
    pub fn new(redis: SharedConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl ViewCache for RedisViewCache {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.redis.lock().await.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.redis.lock().await.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.redis.lock().await.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

/// Typed read-through layer over a `ViewCache`
#[derive(Clone)]
pub struct CatalogCache {
    backend: Arc<dyn ViewCache>,
    ttl: Duration,
    write_timeout: Duration,
    metrics: CacheMetrics,
}

impl CatalogCache {
    pub fn new(backend: Arc<dyn ViewCache>, ttl: Duration, write_timeout: Duration) -> Self {
        Self {
            backend,
            ttl,
            write_timeout,
            metrics: CacheMetrics::new(),
        }
    }

    /// Cached value, or `None` on miss, backend failure or undecodable entry
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_raw(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                self.metrics.record_miss(key);
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache get failed");
                self.metrics.record_error(key, "get");
                return None;
            }
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                debug!(key = %key, "Cache hit");
                self.metrics.record_hit(key);
                Some(value)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache deserialization failed");
                self.metrics.record_error(key, "deserialize");
                // Drop the corrupted entry so the next read repopulates it
                let _ = self.backend.del(key).await;
                None
            }
        }
    }

    /// Store a view, bounded by the write timeout; failures are logged only
    pub async fn put<T: Serialize + Sync>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache serialization failed");
                self.metrics.record_error(key, "serialize");
                return;
            }
        };

        match tokio::time::timeout(self.write_timeout, self.backend.set_raw(key, raw, self.ttl))
            .await
        {
            Ok(Ok(())) => {
                debug!(key = %key, ttl_secs = self.ttl.as_secs(), "Cache set");
                self.metrics.record_write(key);
            }
            Ok(Err(e)) => {
                warn!(key = %key, error = %e, "Cache set failed");
                self.metrics.record_error(key, "set");
            }
            Err(_) => {
                warn!(key = %key, error = %CacheError::Timeout, "Cache set failed");
                self.metrics.record_error(key, "timeout");
            }
        }
    }
}
