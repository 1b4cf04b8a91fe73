use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::{Client, ConnectionInfo, IntoConnectionInfo};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::info;

/// Shared Redis connection manager guarded by a Tokio mutex.
pub type SharedConnectionManager = Arc<Mutex<ConnectionManager>>;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis connection pool backed by a single multiplexed, auto-reconnecting manager.
pub struct RedisPool {
    manager: SharedConnectionManager,
}

impl RedisPool {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let info: ConnectionInfo = parse_redis_url(redis_url)?;
        let db = info.redis.db;

        let client = Client::open(info).context("failed to construct Redis client")?;
        let mut connection_manager = ConnectionManager::new(client)
            .await
            .context("failed to initialize Redis connection manager")?;

        let pong: String = timeout(
            PING_TIMEOUT,
            redis::cmd("PING").query_async(&mut connection_manager),
        )
        .await
        .context("Redis PING timed out")?
        .context("Redis PING failed")?;

        info!(db, reply = %pong, "Redis connection established");

        Ok(Self {
            manager: Arc::new(Mutex::new(connection_manager)),
        })
    }

    pub fn manager(&self) -> SharedConnectionManager {
        self.manager.clone()
    }
}

fn parse_redis_url(redis_url: &str) -> Result<ConnectionInfo> {
    redis_url
        .into_connection_info()
        .context("failed to parse REDIS_URL connection string")
}
