//! Namespace-based cache invalidation over Redis
//!
//! Read-views are cached under versioned keys grouped by namespace
//! (`v1:videos:*`, `v1:categories:*`, `v1:accounts:*`). After a write commits,
//! the whole namespace is evicted with `SCAN MATCH` + pipelined `DEL`, so the
//! next read recomputes from the database.
//!
//! # Architecture
//!
//! ```text
//! Admin write path:
//!   1. Commit transaction
//!   2. dispatcher.dispatch("update_category", &Namespace::ALL)   (returns immediately)
//!      ↓
//! Detached tokio task (own 5s deadline):
//!   3. SCAN 0 MATCH v1:videos:* COUNT 100 → DEL ...
//!   4. SCAN 0 MATCH v1:categories:* COUNT 100 → DEL ...
//!   5. SCAN 0 MATCH v1:accounts:* COUNT 100 → DEL ...
//!      (each namespace independent, failures logged)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cache_invalidation::{InvalidationDispatcher, Namespace, RedisCacheInvalidator, SpawnedDispatcher};
//! use redis_utils::RedisPool;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let redis = RedisPool::connect("redis://localhost:6379").await?;
//!     let invalidator = Arc::new(RedisCacheInvalidator::new(redis.manager()));
//!
//!     let dispatcher = SpawnedDispatcher::new(invalidator);
//!     dispatcher.dispatch("delete_video", &Namespace::ALL);
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use redis::Pipeline;
use redis_utils::SharedConnectionManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

mod dispatcher;
mod error;
mod helpers;
mod stats;

pub use dispatcher::{
    run_invalidation, InvalidationDispatcher, InvalidationReport, SpawnedDispatcher,
    DEFAULT_INVALIDATION_TIMEOUT,
};
pub use error::InvalidationError;
pub use helpers::{build_cache_key, key_in_namespace, parse_namespace};
pub use stats::{InvalidationStats, StatsCollector};

/// Result type for invalidation operations
pub type Result<T> = std::result::Result<T, InvalidationError>;

/// Key schema version, bumped when cached view layouts change
pub const CACHE_VERSION: &str = "v1";

/// Keys requested per SCAN round trip
pub const SCAN_BATCH_SIZE: usize = 100;

/// Group of cached read-views evicted together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Videos,
    Categories,
    Accounts,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Videos, Namespace::Categories, Namespace::Accounts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Videos => "videos",
            Namespace::Categories => "categories",
            Namespace::Accounts => "accounts",
        }
    }

    /// `v1:<namespace>`
    pub fn prefix(&self) -> String {
        format!("{}:{}", CACHE_VERSION, self.as_str())
    }

    /// SCAN pattern covering every key in the namespace
    pub fn pattern(&self) -> String {
        format!("{}:*", self.prefix())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = InvalidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "videos" => Ok(Namespace::Videos),
            "categories" => Ok(Namespace::Categories),
            "accounts" => Ok(Namespace::Accounts),
            other => Err(InvalidationError::UnknownNamespace(other.to_string())),
        }
    }
}

/// Evicts cached read-views by namespace
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Delete every key under `namespace`, returning how many were removed
    async fn invalidate(&self, namespace: Namespace) -> Result<usize>;

    async fn invalidate_videos(&self) -> Result<usize> {
        self.invalidate(Namespace::Videos).await
    }

    async fn invalidate_categories(&self) -> Result<usize> {
        self.invalidate(Namespace::Categories).await
    }

    async fn invalidate_accounts(&self) -> Result<usize> {
        self.invalidate(Namespace::Accounts).await
    }
}

/// Redis-backed invalidator using non-blocking SCAN
#[derive(Clone)]
pub struct RedisCacheInvalidator {
    redis: SharedConnectionManager,
    batch_size: usize,
}

impl RedisCacheInvalidator {
    pub fn new(redis: SharedConnectionManager) -> Self {
        Self {
            redis,
            batch_size: SCAN_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn scan_del(&self, pattern: &str) -> Result<usize> {
        // ConnectionManager is multiplexed; clone it so the lock is not held across the scan
        let mut conn = self.redis.lock().await.clone();
        let mut cursor: u64 = 0;
        let mut total_deleted = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(self.batch_size)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let mut pipe = Pipeline::new();
                for key in &keys {
                    pipe.del(key).ignore();
                }
                pipe.query_async::<_, ()>(&mut conn).await?;

                total_deleted += keys.len();
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(pattern = %pattern, deleted = total_deleted, "Cache scan delete");
        Ok(total_deleted)
    }
}

#[async_trait]
impl CacheInvalidator for RedisCacheInvalidator {
    async fn invalidate(&self, namespace: Namespace) -> Result<usize> {
        self.scan_del(&namespace.pattern()).await
    }
}
