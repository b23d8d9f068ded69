//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::{Ipv4Addr, SocketAddr};

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "chatd".to_string()
}

pub fn default_listen_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 6667))
}

// =============================================================================
// Heartbeat Defaults
// =============================================================================

pub fn default_probe_interval() -> u64 {
    5
}

pub fn default_heartbeat_timeout() -> u64 {
    15
}

// =============================================================================
// Limits Defaults
// =============================================================================

pub fn default_max_line_len() -> usize {
    chat_proto::DEFAULT_MAX_LINE_LEN
}

pub fn default_max_nick_len() -> usize {
    32
}

pub fn default_send_queue() -> usize {
    64
}

pub fn default_max_send_overflows() -> u32 {
    16
}

pub fn default_negotiation_timeout() -> u64 {
    60
}
