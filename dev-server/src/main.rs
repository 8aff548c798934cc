//! Development server for the sensor client
//!
//! Runs the in-process stub backend on a fixed address and fills it with a
//! small dataset, so the `sensor` binary can be pointed at it.
//!
//! Environment variables (optional, also read from .env):
//! - IP_ADDRESS: bind address (default 127.0.0.1)
//! - PORT: bind port (default 8000)
//!
//! Usage: cargo run -p dev-server

use anyhow::Result;
use test_helpers::{backend::Config, mock::DevDataset};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize logging
    let subscriber = client::telemetry::get_subscriber("info".into());
    client::telemetry::init_subscriber(subscriber)?;

    info!("🚀 Starting sensor development server");

    let config = Config::from_env()?;
    let app = test_helpers::spawn_app_with(config).await;
    info!("✅ Stub backend running on {}", app.address);

    let dataset = DevDataset::create(&app).await?;

    info!("🎯 Development server ready!");
    info!("   CLI: SENSOR_API_BASE_URL={} sensor list", app.address);
    info!("");
    dataset.print_summary();
    info!("");
    info!("👋 Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutting down development server");
    Ok(())
}
