//! Shopfeed service entry point.
//!
//! Bootstraps configuration, connects the Postgres-backed catalog with
//! the in-process cache, and runs the periodic feed ingestion job until
//! interrupted.

use std::sync::Arc;

use shopfeed_api::{
    ingestion_task, ApiResult, CachedCatalog, DbClient, DbConfig, HttpFeedSource, IngestionConfig,
};
use shopfeed_storage::{CacheConfig, MemoryCacheBackend};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;
    tracing::info!(host = %db_config.host, dbname = %db_config.dbname, "catalog store connected");

    let cache = Arc::new(MemoryCacheBackend::new());
    let catalog = Arc::new(CachedCatalog::new(db, cache, CacheConfig::default()));

    let ingestion_config = IngestionConfig::from_env();
    let source = Arc::new(HttpFeedSource::new(ingestion_config.feed_url.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let job = tokio::spawn(ingestion_task(
        Arc::clone(&catalog),
        source,
        ingestion_config,
        shutdown_rx,
    ));

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| shopfeed_api::ApiError::internal_error(format!("signal error: {e}")))?;
    tracing::info!("shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = job.await;

    Ok(())
}
