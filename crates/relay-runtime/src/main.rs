//! # Neuro-Relay Runtime
//!
//! Hosts the gated relay core in one process.
//!
//! ## Startup Sequence
//!
//! 1. Load telemetry and runtime configuration from `NR_*` variables
//! 2. Initialize logging and metrics
//! 3. Wire the container and start the thalamus boundary
//! 4. Run until Ctrl+C, then shut down gracefully

use anyhow::{Context, Result};
use relay_runtime::{RelayRuntime, RuntimeConfig};
use relay_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = init_telemetry(&TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env().context("Invalid runtime configuration")?;

    let mut runtime = RelayRuntime::new(config).context("Failed to build relay container")?;
    runtime.start().context("Failed to start relay runtime")?;

    info!("Relay is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    match telemetry.metrics().encode() {
        Ok(text) => info!(bytes = text.len(), "Final metrics snapshot encoded"),
        Err(e) => tracing::warn!(error = %e, "Failed to encode final metrics"),
    }

    Ok(())
}
