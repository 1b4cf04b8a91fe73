//! Prometheus gauges for the database connection pool

use prometheus::{register_int_gauge_vec, IntGaugeVec};
use sqlx::PgPool;

lazy_static::lazy_static! {
    /// Database connection pool size by state (idle/active/max).
    /// `None` when a gauge with the same name was already registered.
    static ref DB_POOL_CONNECTIONS: Option<IntGaugeVec> = register_int_gauge_vec!(
        "db_pool_connections",
        "Database pool connection count by state",
        &["service", "state"]
    ).ok();
}

/// Update connection pool gauges (called periodically)
pub(crate) fn update_pool_metrics(pool: &PgPool, service: &str) {
    let Some(gauge) = DB_POOL_CONNECTIONS.as_ref() else {
        return;
    };

    let size = pool.size() as i64;
    let idle = pool.num_idle() as i64;

    gauge.with_label_values(&[service, "idle"]).set(idle);
    gauge.with_label_values(&[service, "active"]).set(size - idle);
    gauge
        .with_label_values(&[service, "max"])
        .set(pool.options().get_max_connections() as i64);
}
