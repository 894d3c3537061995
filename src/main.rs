//! # Main Entry Point
//!
//! Resolves configuration, sets up logging and serves the MigratorXpress
//! tools over stdio:
//! - Domain: requests, capabilities, flags, versions, configuration
//! - Application: builder, auth checks, workflows, version detection, session
//! - Infrastructure: subprocess execution and execution logs
//! - Interface: MCP server

mod application;
mod cli;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::application::session::MigrationSession;
use crate::cli::Cli;
use crate::domain::config::{AppConfig, FileConfig};
use crate::interface::server::MigratorXpressServer;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let file = match cli.config.clone().or_else(FileConfig::default_path) {
        Some(path) => FileConfig::load(&path)?,
        None => FileConfig::default(),
    };
    let config = Arc::new(AppConfig::resolve(cli.overrides(), file)?);

    // 2. Logging. Stdout is the MCP transport, so the console layer writes to stderr.
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory {}", config.log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&config.log_dir, "server.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.filter_directives()));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Starting MigratorXpress MCP server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("MigratorXpress binary: {}", config.binary_path.display());
    tracing::info!(
        "Timeout: {}s, handle TTL: {}s, log dir: {}",
        config.timeout.as_secs(),
        config.handle_ttl.as_secs(),
        config.log_dir.display()
    );

    // 3. Detect the version once; tool calls only read the cached result.
    let session = Arc::new(MigrationSession::new(config));
    match session.detector().detect().await {
        Some(version) => tracing::info!("MigratorXpress version: {}", version),
        None => tracing::warn!("MigratorXpress version not detected"),
    }

    // 4. Serve
    let service = MigratorXpressServer::new(session)
        .serve(stdio())
        .await
        .context("Failed to start MCP server on stdio")?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(reason) => tracing::info!("MCP service ended: {:?}", reason),
                Err(e) => tracing::error!("MCP service ended with error: {}", e),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
