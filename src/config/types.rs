//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{default_heartbeat_timeout, default_probe_interval, default_server_name};
use super::limits::LimitsConfig;
use super::listen::ListenConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server information.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Liveness probe timing.
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
    /// Per-session limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name shown in the greeting (default: "chatd").
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Port for the Prometheus `/metrics` endpoint. Disabled when absent.
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            metrics_port: None,
        }
    }
}

/// Heartbeat supervisor timing.
///
/// - `probe_interval_secs`: seconds between `HEARTBEAT` probes (default: 5)
/// - `timeout_secs`: seconds without a reply before eviction (default: 15)
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatConfig {
    /// Seconds between liveness probes (default: 5).
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,

    /// Seconds of silence tolerated before the session is evicted (default: 15).
    #[serde(default = "default_heartbeat_timeout")]
    pub timeout_secs: u64,
}

impl HeartbeatConfig {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_probe_interval(),
            timeout_secs: default_heartbeat_timeout(),
        }
    }
}
