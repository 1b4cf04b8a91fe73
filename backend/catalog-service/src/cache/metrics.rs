//! Read-through cache counters

use cache_invalidation::parse_namespace;
use prometheus::{CounterVec, Opts, Registry};
use std::sync::OnceLock;

static METRICS: OnceLock<Option<CacheMetricsInner>> = OnceLock::new();

struct CacheMetricsInner {
    hits: CounterVec,
    misses: CounterVec,
    writes: CounterVec,
    errors: CounterVec,
}

impl CacheMetricsInner {
    fn new() -> Result<Self, prometheus::Error> {
        Ok(Self {
            hits: CounterVec::new(
                Opts::new("catalog_cache_hits_total", "Total cache hits"),
                &["namespace"],
            )?,
            misses: CounterVec::new(
                Opts::new("catalog_cache_misses_total", "Total cache misses"),
                &["namespace"],
            )?,
            writes: CounterVec::new(
                Opts::new("catalog_cache_writes_total", "Total cache writes"),
                &["namespace"],
            )?,
            errors: CounterVec::new(
                Opts::new("catalog_cache_errors_total", "Total cache errors"),
                &["namespace", "error_type"],
            )?,
        })
    }

    fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        registry.register(Box::new(self.hits.clone()))?;
        registry.register(Box::new(self.misses.clone()))?;
        registry.register(Box::new(self.writes.clone()))?;
        registry.register(Box::new(self.errors.clone()))?;
        Ok(())
    }
}

fn get_metrics() -> Option<&'static CacheMetricsInner> {
    METRICS.get_or_init(|| CacheMetricsInner::new().ok()).as_ref()
}

fn namespace_label(key: &str) -> &'static str {
    parse_namespace(key)
        .map(|namespace| namespace.as_str())
        .unwrap_or("unknown")
}

#[derive(Clone, Default)]
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Register counters with a Prometheus registry
    pub fn register(registry: &Registry) -> Result<(), prometheus::Error> {
        match get_metrics() {
            Some(metrics) => metrics.register(registry),
            None => Ok(()),
        }
    }

    pub fn record_hit(&self, key: &str) {
        if let Some(metrics) = get_metrics() {
            metrics.hits.with_label_values(&[namespace_label(key)]).inc();
        }
    }

    pub fn record_miss(&self, key: &str) {
        if let Some(metrics) = get_metrics() {
            metrics.misses.with_label_values(&[namespace_label(key)]).inc();
        }
    }

    pub fn record_write(&self, key: &str) {
        if let Some(metrics) = get_metrics() {
            metrics.writes.with_label_values(&[namespace_label(key)]).inc();
        }
    }

    pub fn record_error(&self, key: &str, error_type: &str) {
        if let Some(metrics) = get_metrics() {
            metrics
                .errors
                .with_label_values(&[namespace_label(key), error_type])
                .inc();
        }
    }
}
