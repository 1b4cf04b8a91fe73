//! In-memory stand-in for Redis, usable both as view cache and invalidator

use async_trait::async_trait;
use cache_invalidation::{key_in_namespace, CacheInvalidator, InvalidationError, Namespace};
use catalog_service::cache::{CacheError, CacheResult, ViewCache};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

fn unavailable() -> redis::RedisError {
    redis::RedisError::from((redis::ErrorKind::IoError, "connection refused"))
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
    failing_namespace: Mutex<Option<Namespace>>,
    invalidation_delay: Mutex<Option<Duration>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every cache and invalidation call fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn fail_namespace(&self, namespace: Namespace) {
        *self.failing_namespace.lock().unwrap() = Some(namespace);
    }

    pub fn delay_invalidation(&self, delay: Duration) {
        *self.invalidation_delay.lock().unwrap() = Some(delay);
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn is_unavailable(&self) -> bool {
        self.unavailable.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ViewCache for MemoryCache {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        if self.is_unavailable() {
            return Err(CacheError::Redis(unavailable()));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String, _ttl: Duration) -> CacheResult<()> {
        if self.is_unavailable() {
            return Err(CacheError::Redis(unavailable()));
        }
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        if self.is_unavailable() {
            return Err(CacheError::Redis(unavailable()));
        }
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[async_trait]
impl CacheInvalidator for MemoryCache {
    async fn invalidate(&self, namespace: Namespace) -> cache_invalidation::Result<usize> {
        let delay = *self.invalidation_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failing = *self.failing_namespace.lock().unwrap();
        if self.is_unavailable() || failing == Some(namespace) {
            return Err(InvalidationError::Redis(unavailable()));
        }

        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|key, _| !key_in_namespace(key, namespace));
        Ok(before - entries.len())
    }
}
