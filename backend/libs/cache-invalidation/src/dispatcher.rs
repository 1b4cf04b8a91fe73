//! Post-commit invalidation scheduling
//!
//! Services hold an `Arc<dyn InvalidationDispatcher>` and call `dispatch` once a
//! transaction has committed. The production dispatcher moves the work onto a
//! detached tokio task with its own deadline, so the caller's response is never
//! held up and cancelling the caller does not cancel the eviction.

use crate::{CacheInvalidator, InvalidationError, Namespace, StatsCollector};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Deadline for one invalidation run, independent of any request deadline
pub const DEFAULT_INVALIDATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Schedules cache invalidation after a committed write
pub trait InvalidationDispatcher: Send + Sync {
    /// Must return without waiting for the eviction to finish
    fn dispatch(&self, origin: &'static str, namespaces: &[Namespace]);
}

/// Outcome of one invalidation run
#[derive(Debug, Clone, Default)]
pub struct InvalidationReport {
    pub cleared: Vec<(Namespace, usize)>,
    pub failed: Vec<Namespace>,
    pub timed_out: Vec<Namespace>,
}

impl InvalidationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.timed_out.is_empty()
    }
}

/// Invalidate every namespace concurrently, each under its own deadline
///
/// Each namespace is attempted regardless of how the others fare. Errors are
/// logged and counted, never returned.
pub async fn run_invalidation(
    invalidator: &dyn CacheInvalidator,
    origin: &str,
    namespaces: &[Namespace],
    timeout: Duration,
    stats: &StatsCollector,
) -> InvalidationReport {
    let started = Instant::now();
    let mut report = InvalidationReport::default();

    let attempts = namespaces.iter().map(|namespace| async move {
        let outcome = tokio::time::timeout(timeout, invalidator.invalidate(*namespace)).await;
        (*namespace, outcome)
    });

    for (namespace, outcome) in join_all(attempts).await {
        match outcome {
            Ok(Ok(deleted)) => {
                debug!(op = %origin, namespace = %namespace, deleted, "Cache namespace invalidated");
                stats.record_cleared(deleted);
                report.cleared.push((namespace, deleted));
            }
            Ok(Err(e)) => {
                warn!(op = %origin, namespace = %namespace, error = %e, "Cache invalidation failed");
                stats.record_failure();
                report.failed.push(namespace);
            }
            Err(_) => {
                let err = InvalidationError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                };
                warn!(op = %origin, namespace = %namespace, error = %err, "Cache invalidation abandoned");
                stats.record_timeout();
                report.timed_out.push(namespace);
            }
        }
    }

    stats.record_run(started.elapsed().as_secs_f64() * 1000.0);
    report
}

/// Runs each invalidation on a detached tokio task
#[derive(Clone)]
pub struct SpawnedDispatcher {
    invalidator: Arc<dyn CacheInvalidator>,
    timeout: Duration,
    stats: StatsCollector,
}

impl SpawnedDispatcher {
    pub fn new(invalidator: Arc<dyn CacheInvalidator>) -> Self {
        Self {
            invalidator,
            timeout: DEFAULT_INVALIDATION_TIMEOUT,
            stats: StatsCollector::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }
}

impl InvalidationDispatcher for SpawnedDispatcher {
    fn dispatch(&self, origin: &'static str, namespaces: &[Namespace]) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(op = %origin, error = %e, "No runtime available, cache invalidation skipped");
                self.stats.record_failure();
                return;
            }
        };

        let invalidator = Arc::clone(&self.invalidator);
        let namespaces = namespaces.to_vec();
        let timeout = self.timeout;
        let stats = self.stats.clone();

        handle.spawn(async move {
            run_invalidation(invalidator.as_ref(), origin, &namespaces, timeout, &stats).await;
        });
    }
}
