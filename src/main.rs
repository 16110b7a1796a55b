// src/main.rs
use clap::Parser;
use dotenv::dotenv;
use tracing::error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod cli;

use cli::Cli;
use mylist::common::{AppState, Config};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let mut config = Config::from_env();
    if let Some(api_url) = args.api_url.as_deref() {
        config = config.with_api_url(api_url);
    }

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let state = AppState::new(config).map_err(|e| {
        error!(error = %e, "Failed to initialize client");
        anyhow::anyhow!(e.user_message())
    })?;

    // ========================================================================
    // COMMAND DISPATCH
    // ========================================================================

    if let Err(e) = cli::run(args.command, &state).await {
        error!(error = %e, "Command failed");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}
