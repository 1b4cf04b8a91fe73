/// Configuration management for Catalog Service
///
/// Everything is read from environment variables (a `.env` file is loaded by
/// the binaries before this runs).
use db_pool::DbConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE_NAME: &str = "catalog-service";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DbConfig,
    /// Cache (Redis) configuration
    pub cache: CacheConfig,
    /// Media link configuration
    pub media: MediaConfig,
    /// Bootstrap admin account
    pub admin: AdminConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
}

/// Cache (Redis) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL
    pub url: String,
    /// Read-through caching and post-commit invalidation on/off
    pub enabled: bool,
    /// TTL of cached read-views, the staleness backstop
    pub ttl_secs: u64,
    /// Deadline for one detached invalidation run
    pub invalidation_timeout_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn invalidation_timeout(&self) -> Duration {
        Duration::from_secs(self.invalidation_timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            enabled: true,
            ttl_secs: 24 * 60 * 60,
            invalidation_timeout_secs: 5,
        }
    }
}

/// Base URL for building media links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub base_url: String,
}

impl MediaConfig {
    /// `{base}/video/{file}`
    pub fn video_url(&self, file: &str) -> String {
        format!("{}/video/{}", self.base_url.trim_end_matches('/'), file)
    }

    /// `{base}/img/{file}`
    pub fn image_url(&self, file: &str) -> String {
        format!("{}/img/{}", self.base_url.trim_end_matches('/'), file)
    }
}

/// Admin account created by the bootstrap binary
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub content_type: String,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("content_type", &self.content_type)
            .finish()
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let cache_defaults = CacheConfig::default();

        let cache = CacheConfig {
            url: std::env::var("REDIS_URL").unwrap_or(cache_defaults.url),
            enabled: env_flag("REDIS_ENABLED", cache_defaults.enabled),
            ttl_secs: env_parse("CACHE_TTL_SECS", cache_defaults.ttl_secs),
            invalidation_timeout_secs: env_parse(
                "CACHE_INVALIDATION_TIMEOUT_SECS",
                cache_defaults.invalidation_timeout_secs,
            ),
        };
        if cache.invalidation_timeout_secs == 0 {
            return Err("CACHE_INVALIDATION_TIMEOUT_SECS must be greater than zero".to_string());
        }

        let media = MediaConfig {
            base_url: std::env::var("MEDIA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        };

        let admin = AdminConfig {
            username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            password: std::env::var("ADMIN_PASSWORD").unwrap_or_default(),
            content_type: std::env::var("ADMIN_CONTENT_TYPE")
                .unwrap_or_else(|_| "admin".to_string()),
        };

        Ok(Config {
            app: AppConfig { env: app_env },
            database: DbConfig::from_env(SERVICE_NAME)?,
            cache,
            media,
            admin,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}
