//! ansible-api - HTTP access to ad-hoc ansible
//!
//! This is the main entry point for the server binary.

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use ansible_api::api::ApiServer;
use ansible_api::config::Config;
use ansible_api::logging::LoggingBuilder;
use ansible_api::runner::LocalRunner;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    cli.apply(&mut config);

    LoggingBuilder::from_config(config.logging.clone())
        .with_verbosity(cli.verbose)
        .init()?;

    info!(version = ansible_api::version(), "ansible-api starting");

    match which::which(&config.ansible.binary) {
        Ok(path) => info!(path = %path.display(), "Using ansible executable"),
        Err(e) => warn!(
            binary = %config.ansible.binary,
            error = %e,
            "ansible executable not found, requests will fail until it is installed"
        ),
    }

    let runner = Arc::new(LocalRunner::from_config(&config.ansible));
    let server = ApiServer::new(config.api_config()?, runner);

    server.run_with_shutdown(shutdown_signal()).await?;

    info!("ansible-api stopped");
    Ok(())
}

/// Resolve on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
