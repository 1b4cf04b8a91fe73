//! Statistics tracking for cache invalidation runs

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Statistics for invalidation runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvalidationStats {
    pub runs: u64,
    pub namespaces_cleared: u64,
    pub keys_deleted: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub latency_p50_ms: f64,
    pub latency_p99_ms: f64,
}

/// Thread-safe statistics collector
#[derive(Clone)]
pub struct StatsCollector {
    runs: Arc<AtomicU64>,
    namespaces_cleared: Arc<AtomicU64>,
    keys_deleted: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
    timeouts: Arc<AtomicU64>,
    latencies: Arc<std::sync::Mutex<Vec<f64>>>,
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCollector {
    /// Create new statistics collector
    pub fn new() -> Self {
        Self {
            runs: Arc::new(AtomicU64::new(0)),
            namespaces_cleared: Arc::new(AtomicU64::new(0)),
            keys_deleted: Arc::new(AtomicU64::new(0)),
            failures: Arc::new(AtomicU64::new(0)),
            timeouts: Arc::new(AtomicU64::new(0)),
            latencies: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Record a finished run and its wall time (in milliseconds)
    pub fn record_run(&self, latency_ms: f64) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut latencies) = self.latencies.lock() {
            latencies.push(latency_ms);
            // Keep only last 1000 samples to prevent unbounded growth
            if latencies.len() > 1000 {
                latencies.drain(0..500);
            }
        }
    }

    /// Record one namespace cleared
    pub fn record_cleared(&self, keys_deleted: usize) {
        self.namespaces_cleared.fetch_add(1, Ordering::Relaxed);
        self.keys_deleted
            .fetch_add(keys_deleted as u64, Ordering::Relaxed);
    }

    /// Record a namespace that failed to clear
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a run that hit its deadline
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> InvalidationStats {
        let (p50, p99) = match self.latencies.lock() {
            Ok(mut latencies) if !latencies.is_empty() => {
                latencies.sort_by(|a, b| a.total_cmp(b));
                let p50_idx = (latencies.len() as f64 * 0.50) as usize;
                let p99_idx = (latencies.len() as f64 * 0.99) as usize;
                (
                    latencies[p50_idx.min(latencies.len() - 1)],
                    latencies[p99_idx.min(latencies.len() - 1)],
                )
            }
            _ => (0.0, 0.0),
        };

        InvalidationStats {
            runs: self.runs.load(Ordering::Relaxed),
            namespaces_cleared: self.namespaces_cleared.load(Ordering::Relaxed),
            keys_deleted: self.keys_deleted.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            latency_p50_ms: p50,
            latency_p99_ms: p99,
        }
    }

    /// Reset all statistics
    pub fn reset(&self) {
        self.runs.store(0, Ordering::Relaxed);
        self.namespaces_cleared.store(0, Ordering::Relaxed);
        self.keys_deleted.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
        if let Ok(mut latencies) = self.latencies.lock() {
            latencies.clear();
        }
    }
}
