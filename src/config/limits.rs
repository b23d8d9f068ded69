//! Per-session limits configuration.

use serde::Deserialize;

use super::defaults::{
    default_max_line_len, default_max_nick_len, default_max_send_overflows,
    default_negotiation_timeout, default_send_queue,
};
use std::time::Duration;

/// Per-session resource limits.
///
/// These bound what a single client can cost the server: how long a line it
/// may send, how long its nickname may be, and how far behind its outbound
/// queue may fall before it is dropped as a slow consumer.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum inbound line length in bytes, newline included (default: 4096).
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Maximum nickname length in characters (default: 32).
    #[serde(default = "default_max_nick_len")]
    pub max_nick_len: usize,
    /// Outbound queue capacity per session (default: 64).
    #[serde(default = "default_send_queue")]
    pub send_queue: usize,
    /// Consecutive dropped envelopes before the recipient is evicted (default: 16).
    #[serde(default = "default_max_send_overflows")]
    pub max_send_overflows: u32,
    /// Seconds a connection may take to pick a nickname (default: 60).
    #[serde(default = "default_negotiation_timeout")]
    pub negotiation_timeout_secs: u64,
}

impl LimitsConfig {
    pub fn negotiation_timeout(&self) -> Duration {
        Duration::from_secs(self.negotiation_timeout_secs)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            max_nick_len: default_max_nick_len(),
            send_queue: default_send_queue(),
            max_send_overflows: default_max_send_overflows(),
            negotiation_timeout_secs: default_negotiation_timeout(),
        }
    }
}
