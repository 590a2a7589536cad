//! Runnable server
//!
//! Configuration comes from the environment:
//!
//! ```text
//! TOKEN=dev-secret \
//! APP_ENV=development \
//! AUTH=google://<base64 client-secret json> \
//! AUTHORIZED_EMAILS=admin@example.com \
//! cargo run --example server
//! ```
//!
//! Without `DATABASE_URI` the server starts with an empty in-memory store.
//! Pass `--config <file.yaml>` to read settings from YAML instead.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use springapi::prelude::*;
use tracing_subscriber::EnvFilter;

/// Submission API server
#[derive(Parser, Debug)]
#[command(name = "springapi", about, long_about = None)]
struct Cli {
    /// Read settings from a YAML file instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            AppConfig::from_yaml_file(&path)
                .with_context(|| format!("loading configuration from {}", path))?
        }
        None => AppConfig::from_env().context("loading configuration from environment")?,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.environment.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        environment = %config.environment,
        bind_addr = %config.bind_addr,
        "Starting springapi"
    );

    ServerBuilder::new(config).serve().await
}

