//! `hedgedesk-proxy` entry point.

use anyhow::Context;
use clap::Parser;
use hedgedesk_proxy::ProxyArgs;
use hedgedesk_proxy::ProxyConfig;
use hedgedesk_proxy::ProxyServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("hedgedesk-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ProxyConfig::from_args(ProxyArgs::parse())?;
    if config.backend_base.is_none() {
        tracing::warn!("HEDGEDESK_API_BASE_URL is not set; /api requests will fail with 500");
    }

    // The blocking HTTP client must be created off the runtime threads.
    let server = tokio::task::spawn_blocking(move || ProxyServer::bind(config))
        .await
        .context("bind task panicked")??;

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Signal received, shutting down");
        shutdown.shutdown();
    });

    tokio::task::spawn_blocking(move || server.serve())
        .await
        .context("server task panicked")?;

    tracing::info!("hedgedesk-proxy exiting cleanly");
    Ok(())
}
