//! bodega daemon entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

use bodega::config::Config;
use bodega::http::{AppState, router};
use bodega::reaper;
use bodega::store::Database;

#[derive(Parser)]
#[command(
    name = "bodega",
    version,
    about = "Multi-tenant TTL key-value cache and message queue daemon"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the SQLite database path.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Run with a non-persistent in-memory database.
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    if cli.in_memory {
        config.database.in_memory = true;
    }

    if config.metrics.enabled {
        let addr = SocketAddr::from(([127, 0, 0, 1], config.metrics.port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!(%addr, "Prometheus exporter listening");
    }

    let db = if config.database.in_memory {
        info!("using in-memory database (data is not persisted)");
        Database::memory()?
    } else {
        info!(path = %config.database.path.display(), "opening database");
        Database::file(&config.database.path)?
    };

    let state = AppState::new(db);
    reaper::spawn(
        state.kv.clone(),
        Duration::from_secs(config.reaper.interval_secs),
    );

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "bodega listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("bodega stopped");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = ?err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
