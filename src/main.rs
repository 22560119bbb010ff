//! Envmon API Server
//!
//! Run with: cargo run --bin envmon
//!
//! # Configuration
//!
//! Settings come from `--config <path>` or the default config locations, with
//! `ENVMON_*` environment overrides (see `envmon-cli init-config`).
//! `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use envmon::api::{serve, AppState};
use envmon::config::{Config, ConfigSource, LoadedConfig};
use envmon::readings::ReadingsService;
use envmon::store::Database;

#[derive(Parser)]
#[command(name = "envmon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Environmental monitoring API server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep records in memory only
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => LoadedConfig {
            config: Config::load_with_env(path)?,
            source: ConfigSource::File(path.clone()),
            skipped: Vec::new(),
        },
        None => Config::load_default(),
    };

    envmon::logging::init(&loaded.config.logging);
    loaded.log();
    let config = loaded.config;

    tracing::info!("Starting Envmon API server v{}", env!("CARGO_PKG_VERSION"));

    let db = if args.ephemeral {
        tracing::warn!("Running with an in-memory database; records are lost on exit");
        Database::in_memory()?
    } else {
        tracing::info!("Database: {}", config.storage.database_path);
        Database::open(&config.storage.database_path)
            .with_context(|| format!("opening {}", config.storage.database_path))?
    };

    let readings =
        ReadingsService::http(config.readings.clone()).context("building readings client")?;
    tracing::info!("Readings script base: {}", config.readings.script_base);

    let state = AppState::new(db, readings, config.api.clone());

    serve(state, &config.api).await?;

    tracing::info!("Envmon API server stopped");
    Ok(())
}
