//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, HeartbeatConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`limits`]: Per-session limits (LimitsConfig)
//! - [`validation`]: Startup checks that collect every problem at once

mod defaults;
mod limits;
mod listen;
mod types;
mod validation;

pub use limits::LimitsConfig;
pub use listen::ListenConfig;
pub use types::{Config, ConfigError, HeartbeatConfig, ServerConfig};
pub use validation::{ValidationError, validate};
