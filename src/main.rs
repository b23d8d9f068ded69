//! chatd - line-oriented TCP chat server.
//!
//! Clients pick a unique nickname, then exchange broadcast and private
//! messages. Every Active session is probed with heartbeats and evicted if
//! it stops answering.

mod config;
mod error;
mod handlers;
mod http;
mod metrics;
mod network;
mod router;
mod state;
mod telemetry;

use crate::config::{Config, ConfigError, validate};
use crate::network::Gateway;
use crate::state::Matrix;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "chatd.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration
    let explicit_path = std::env::args().nth(1);
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if explicit_path.is_none() && e.kind() == ErrorKind::NotFound => {
            info!(path = %config_path, "No config file found, using defaults");
            Config::default()
        }
        Err(e) => {
            error!(path = %config_path, error = %e, "Failed to load config");
            return Err(e.into());
        }
    };

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }

    info!(
        server = %config.server.name,
        address = %config.listen.address,
        probe_secs = config.heartbeat.probe_interval_secs,
        timeout_secs = config.heartbeat.timeout_secs,
        "Starting chatd"
    );

    metrics::init();

    let listen_addr = config.listen.address;
    let metrics_port = config.server.metrics_port;
    let matrix = Arc::new(Matrix::new(config));

    // Prometheus metrics are optional.
    if let Some(port) = metrics_port {
        tokio::spawn(http::run_http_server(
            port,
            matrix.shutdown_token().clone(),
        ));
    }

    {
        let matrix = Arc::clone(&matrix);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            info!("Shutdown requested");
            matrix.shutdown();
        });
    }

    let gateway = Gateway::bind(listen_addr, Arc::clone(&matrix)).await?;
    gateway.run().await?;

    info!("Server stopped");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the `info` default;
/// `CHATD_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("CHATD_LOG_JSON").is_ok_and(|v| v == "1");

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
