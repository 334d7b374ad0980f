//! Intents Swap Simulator - local stand-in for a cross-chain intents API
//!
//! Serves production-shaped quote and status endpoints while swaps are
//! settled by the in-process simulation engine.

use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use intents_swap_sim::api;
use intents_swap_sim::config::{LogConfig, Settings};
use intents_swap_sim::metrics::MetricsServer;
use intents_swap_sim::SwapSimulator;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load()?;

    // Initialize logging
    init_logging(&settings.log);

    info!("Starting Intents Swap Simulator v{}", env!("CARGO_PKG_VERSION"));
    match Settings::config_path() {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => warn!("No configuration file found, using defaults"),
    }

    let simulator = Arc::new(SwapSimulator::from_settings(&settings)?);
    info!(
        "Native chain {}, {} registered assets",
        simulator.native_chain(),
        simulator.registry().len()
    );

    // Retention sweep (no-op when disabled)
    let retention_handle = simulator
        .store()
        .start_retention_sweep(&settings.retention)?;

    // Start metrics server
    let metrics_handle = if settings.metrics.enabled {
        let server = MetricsServer::new(settings.metrics.port);
        Some(tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("Metrics server error: {}", e);
            }
        }))
    } else {
        None
    };

    // Start API server
    let api_handle = tokio::spawn({
        let config = settings.server.clone();
        let simulator = simulator.clone();
        async move {
            if let Err(e) = api::run_server(config, simulator).await {
                error!("API server error: {}", e);
            }
        }
    });

    info!("Intents Swap Simulator is running");
    info!("API server: http://{}:{}", settings.server.host, settings.server.port);
    if settings.metrics.enabled {
        info!("Metrics: http://0.0.0.0:{}/metrics", settings.metrics.port);
    }

    // Wait for shutdown signal
    shutdown_signal().await;

    info!(
        "Shutdown signal received, {} swaps still settling",
        simulator.scheduler().pending()
    );

    api_handle.abort();
    retention_handle.abort();
    if let Some(h) = metrics_handle {
        h.abort();
    }

    info!("Intents Swap Simulator stopped");
    Ok(())
}

fn init_logging(config: &LogConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,intents_swap_sim=debug,hyper=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
