//! Faultline proxy server
//!
//! Loads configuration and serves the fault-injecting reverse proxy.

use anyhow::Context;
use infrastructure::{AppConfig, init_telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_telemetry(&config.telemetry)?;

    info!("faultline v{} starting", env!("CARGO_PKG_VERSION"));

    let stats = presentation_http::serve(&config).await?;

    info!(drop_rate = stats.drop_rate(), "Server shutdown complete");
    Ok(())
}
