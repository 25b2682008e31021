mod api;
mod config;
mod mac;
mod registry;
mod registry_manager;
mod resolver;
mod store;
mod wol;

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use crate::config::Config;
use crate::registry::Registry;
use crate::registry_manager::RegistryHandle;
use crate::resolver::MacResolver;
use crate::store::HostStore;
use crate::wol::UdpDispatcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wakehostd=info"))
        )
        .init();

    tracing::info!("Starting wakehostd");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/wakehost/wakehostd.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    tracing::info!("Loaded config from {}", config_path);

    // Host file; fail early if it exists but cannot be parsed
    let store = HostStore::new(&config.store);
    let initial_hosts = store
        .load()
        .await
        .with_context(|| format!("Failed to load hosts from {}", store.path().display()))?;
    tracing::info!(
        "Loaded {} hosts from {}",
        initial_hosts.as_slice().len(),
        store.path().display()
    );

    let initial_hash = crate::store::hash::compute_hash(initial_hosts.as_slice());
    let (hash_tx, hash_rx) = watch::channel(initial_hash);

    let registry = Registry::new(
        store,
        MacResolver::system(&config.resolver),
        Arc::new(UdpDispatcher::new(config.wake.broadcast, config.wake.port)),
    );

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    let (registry_handle, registry_task) = RegistryHandle::spawn(registry, hash_tx, cancel.clone());

    let app = api::routes::router(api::routes::AppState {
        registry: registry_handle,
        hash_rx,
    });

    // Bind HTTP server
    let listener = tokio::net::TcpListener::bind(&config.api.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.api.listen))?;

    tracing::info!("API listening on {}", config.api.listen);

    // Run server with graceful shutdown
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");

    cancel.cancel();

    let _ = tokio::join!(server_handle, registry_task);

    tracing::info!("Shutdown complete");
    Ok(())
}
