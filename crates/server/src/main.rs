//! catalog-cache server entry point.
//!
//! Boots the in-memory cache, the upstream client and the refresher, then
//! serves HTTP until Ctrl-C. Logs are JSON on stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_client::{Catalog, CatalogClient, CatalogConfig};
use catalog_core::{AppConfig, CacheStore};
use catalog_server::{AppState, Refresher, router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let cache = CacheStore::open_in_memory().await.context("opening cache")?;
    let catalog: Arc<dyn Catalog> = Arc::new(CatalogClient::new(CatalogConfig::from(&config))?);

    let refresher = Refresher::from_config(cache.clone(), catalog.clone(), &config);
    if config.refresh_on_startup {
        let startup = refresher.clone();
        tokio::spawn(async move {
            if let Err(err) = startup.run_once().await {
                tracing::error!(error = %err, "startup cache refresh aborted");
            }
        });
    }

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let refresh_handle = refresher.spawn(shutdown_rx);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
    tracing::info!(
        addr = %addr,
        upstream = %config.upstream_base_url,
        refresh_interval_secs = config.refresh_interval_secs,
        "Starting catalog-cache server"
    );

    axum::serve(listener, router(AppState::new(cache, catalog)))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for shutdown signal");
            }
        })
        .await?;

    let _ = shutdown_tx.send(());
    refresh_handle.await?;
    tracing::info!("Server stopped");

    Ok(())
}
