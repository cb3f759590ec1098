//! Smart market maker - Entry Point
//!
//! Quotes one pair on a paper-trading account against live market data.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Smart market maker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // CLI arg > SMM_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("SMM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = smm_bot::AppConfig::from_file(&config_path)?;
    smm_telemetry::init_logging(&config.logging)?;

    info!("Starting smm-bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_path = %config_path,
        pair = %config.maker.trading_pair,
        refresh_ms = config.maker.order_refresh_interval_ms,
        "Configuration loaded"
    );

    let app = smm_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
