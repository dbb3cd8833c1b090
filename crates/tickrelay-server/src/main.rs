//! TickRelay - Entry Point
//!
//! Keeps an in-memory asset catalog synchronized with the upstream
//! platform, streams live prices into it over WebSocket, and serves
//! both through an HTTP query API.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// TickRelay market data service
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TICKRELAY_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    tickrelay_stream::init_crypto();

    let args = Args::parse();

    tickrelay_telemetry::init_logging()?;

    info!("Starting TickRelay v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > TICKRELAY_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("TICKRELAY_CONFIG").ok())
        .unwrap_or_else(|| "config.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let config = tickrelay_server::AppConfig::from_file(&config_path)?;
    config.validate()?;

    let app = tickrelay_server::Application::new(config)?;
    app.run().await?;

    Ok(())
}
