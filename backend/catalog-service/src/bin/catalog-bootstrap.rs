//! Prepare a catalog deployment: migrate the schema, seed the admin account
//! and drop any read views cached by a previous schema.

use anyhow::{anyhow, Context, Result};
use catalog_service::app::CatalogApp;
use catalog_service::config::Config;
use catalog_service::db::{seed, MIGRATOR};
use catalog_service::logging::{init_tracing, LogFormat};
use db_pool::run_migrations;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::from_env()).context("failed to install tracing subscriber")?;

    let config = Config::from_env().map_err(|e| anyhow!("invalid configuration: {}", e))?;
    info!(env = %config.app.env, "Starting catalog bootstrap");
    config.database.log_config();

    let app = CatalogApp::connect(&config).await?;
    run_migrations(&app.pool, &MIGRATOR)
        .await
        .context("failed to run migrations")?;

    let outcome = seed::ensure_admin(&app.pool, &config.admin)
        .await
        .context("failed to seed admin account")?;
    info!(
        content_type_id = outcome.content_type_id,
        content_type_created = outcome.content_type_created,
        admin_created = outcome.admin_created,
        "Admin account ready"
    );

    if let Err(e) = app
        .admin
        .verify_admin(&config.admin.username, &config.admin.password)
        .await
    {
        warn!(username = %config.admin.username, error = %e, "Configured admin credentials do not match the stored account");
    }

    match app.evict_all("bootstrap").await {
        Some(report) if report.is_clean() => {
            let deleted: usize = report.cleared.iter().map(|(_, n)| n).sum();
            info!(keys_deleted = deleted, "Cached views evicted");
        }
        Some(report) => warn!(?report, "Some cached views could not be evicted"),
        None => info!("Cache disabled, skipping view eviction"),
    }

    app.pool.close().await;
    Ok(())
}
