//! Error types for cache invalidation operations

use thiserror::Error;

/// Cache invalidation errors
#[derive(Error, Debug)]
pub enum InvalidationError {
    /// Redis connection or operation error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Cache key does not belong to a known namespace
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// Namespace name could not be parsed
    #[error("Unknown cache namespace: {0}")]
    UnknownNamespace(String),

    /// Invalidation run exceeded its deadline
    #[error("Invalidation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}
