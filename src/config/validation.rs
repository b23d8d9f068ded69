//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("heartbeat.probe_interval_secs must be greater than zero")]
    ZeroProbeInterval,
    #[error("heartbeat.timeout_secs ({timeout}) must exceed probe_interval_secs ({interval})")]
    TimeoutNotAfterProbe { interval: u64, timeout: u64 },
    #[error("limits.max_line_len must be at least {min}, got {got}")]
    LineLimitTooSmall { min: usize, got: usize },
    #[error("limits.max_nick_len must be at least 1")]
    ZeroNickLen,
    #[error("limits.send_queue must be at least 1")]
    ZeroSendQueue,
    #[error("limits.max_send_overflows must be at least 1")]
    ZeroSendOverflows,
    #[error("limits.negotiation_timeout_secs must be greater than zero")]
    ZeroNegotiationTimeout,
}

/// Smallest accepted inbound line limit.
const MIN_LINE_LEN: usize = 64;

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    // Heartbeat timing
    let hb = &config.heartbeat;
    if hb.probe_interval_secs == 0 {
        errors.push(ValidationError::ZeroProbeInterval);
    }
    if hb.timeout_secs <= hb.probe_interval_secs {
        errors.push(ValidationError::TimeoutNotAfterProbe {
            interval: hb.probe_interval_secs,
            timeout: hb.timeout_secs,
        });
    }

    // Limits
    let limits = &config.limits;
    if limits.max_line_len < MIN_LINE_LEN {
        errors.push(ValidationError::LineLimitTooSmall {
            min: MIN_LINE_LEN,
            got: limits.max_line_len,
        });
    }
    if limits.max_nick_len == 0 {
        errors.push(ValidationError::ZeroNickLen);
    }
    if limits.send_queue == 0 {
        errors.push(ValidationError::ZeroSendQueue);
    }
    if limits.max_send_overflows == 0 {
        errors.push(ValidationError::ZeroSendOverflows);
    }
    if limits.negotiation_timeout_secs == 0 {
        errors.push(ValidationError::ZeroNegotiationTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
