//! # Automation Builder API Main Entry Point
//!
//! This is the main entry point for the Automation Builder API service.

use automation_builder::{config::ConfigLoader, server::run_server, telemetry::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from layered env files and variables
    let config = ConfigLoader::new().load()?;

    init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::info!(configuration = %redacted_json, "Effective configuration");
    }

    // Start the server with the loaded configuration
    run_server(config).await
}
