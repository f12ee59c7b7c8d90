//! Reconciliation runner.
//!
//! Loads configuration, connects to PostgreSQL, and re-mirrors approved
//! memberships the provider never acknowledged.

use std::sync::Arc;

use anyhow::Context;
use chat_spaces::adapters::{
    HttpGatewayConfig, HttpSyncGateway, PostgresChatSpaceStore, PostgresMemberDirectory,
    TracingNotifier, TracingSyncReporter,
};
use chat_spaces::application::ChatSpaceService;
use chat_spaces::config::AppConfig;
use chat_spaces::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    telemetry::init_tracing(&config.server);

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    let gateway = HttpSyncGateway::new(HttpGatewayConfig::from(&config.sync))
        .context("Failed to build sync gateway")?;

    let service = ChatSpaceService::new(
        Arc::new(PostgresChatSpaceStore::new(pool.clone())),
        Arc::new(PostgresMemberDirectory::new(pool.clone())),
        Arc::new(gateway),
        Arc::new(TracingNotifier::new()),
        Arc::new(TracingSyncReporter::new()),
        config.sync.dispatch,
    );

    let result = service
        .reconcile(config.server.reconcile_batch_size)
        .await
        .context("Reconciliation failed")?;

    tracing::info!(
        attempted = result.attempted,
        synced = result.synced,
        failed = result.failed,
        skipped = result.skipped,
        "Reconciliation complete"
    );

    pool.close().await;
    Ok(())
}
