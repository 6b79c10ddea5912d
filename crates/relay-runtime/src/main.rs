//! # Guardian-Relay
//!
//! Local-mode relay: reads hex-encoded VAAs from stdin (one per line) as a
//! stand-in for the gossip network and runs them through verification,
//! routing, queue ingestion and payload parsing.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging
//! 2. Load configuration from `GR_*` variables and validate it
//! 3. Build subsystems in dependency order
//! 4. Start background tasks and the stdin feed
//! 5. Run until Ctrl+C, then drain

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use relay_runtime::adapters::stdin_feed::spawn_stdin_feed;
use relay_runtime::{RelayConfig, RelayContainer, RelayRuntime};
use relay_telemetry::{init_tracing, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&TelemetryConfig::from_env()).context("Failed to initialize logging")?;

    let config = RelayConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    let gossip_buffer = config.queue.gossip_buffer;

    let container = RelayContainer::new(config)?;
    let mut runtime = RelayRuntime::new(container);

    let (tx, rx) = mpsc::channel(gossip_buffer);
    runtime.start(rx);
    spawn_stdin_feed(tx).context("Failed to start stdin feed")?;

    info!("Relay is running, reading VAAs from stdin. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
