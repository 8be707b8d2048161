//! # Tesseract Bridge
//!
//! Entry point: load configuration, start the runtime, run until Ctrl+C.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use bridge_runtime::{load_config, BridgeRuntime};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = load_config()?;

    let mut runtime = BridgeRuntime::new(config).context("invalid configuration")?;
    match runtime.start().await.context("failed to start bridge")? {
        Some(addr) => info!(addr = %addr, "Bridge is running. Press Ctrl+C to stop."),
        None => info!("Bridge is running without HTTP. Press Ctrl+C to stop."),
    }

    tokio::signal::ctrl_c().await?;

    // Graceful shutdown
    runtime.shutdown().await;

    Ok(())
}
