//! Prometheus metrics collection for chatd.
//!
//! Exposed on the optional HTTP endpoint (see [`crate::http`]). Every
//! recording helper is a no-op until [`init`] has run, so library code and
//! unit tests can call them freely.
//!
//! - `chat_connected_sessions` - Active sessions (gauge)
//! - `chat_command_total{command}` - Commands processed by type
//! - `chat_command_duration_seconds{command}` - Command latency histogram
//! - `chat_message_fanout` - Recipients per broadcast (histogram)
//! - `chat_evictions_total{reason}` - Sessions torn down, by cause

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Total TCP connections accepted.
pub static CONNECTIONS: OnceLock<IntCounter> = OnceLock::new();

/// Total envelopes enqueued for delivery.
pub static MESSAGES_SENT: OnceLock<IntCounter> = OnceLock::new();

/// Envelopes dropped because the recipient's queue was full.
pub static MESSAGES_DROPPED: OnceLock<IntCounter> = OnceLock::new();

/// Sessions torn down, by close reason.
pub static EVICTIONS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Currently Active sessions.
pub static CONNECTED_SESSIONS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Dispatch metrics
// ========================================================================

/// Commands processed by type (NICK, MSG, TEXT, etc.).
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command processing latency by command type.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Command errors by type and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Message fan-out histogram: how many recipients per broadcast.
pub static MESSAGE_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup; later calls leave the first registration in place.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(CONNECTIONS, IntCounter::new("chat_connections_total", "TCP connections accepted"));
    register!(MESSAGES_SENT, IntCounter::new("chat_messages_sent_total", "Envelopes enqueued for delivery"));
    register!(MESSAGES_DROPPED, IntCounter::new("chat_messages_dropped_total", "Envelopes dropped on a full send queue"));
    register!(EVICTIONS, IntCounterVec::new(Opts::new("chat_evictions_total", "Sessions closed by reason"), &["reason"]));
    register!(CONNECTED_SESSIONS, IntGauge::new("chat_connected_sessions", "Currently active sessions"));

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("chat_command_total", "Commands processed by type"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("chat_command_duration_seconds", "Command latency by type")
            .buckets(vec![0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("chat_command_errors_total", "Command errors by type"), &["command", "error"]));
    register!(MESSAGE_FANOUT, Histogram::with_opts(
        HistogramOpts::new("chat_message_fanout", "Recipients per broadcast")
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

#[inline]
pub fn inc_connections() {
    if let Some(c) = CONNECTIONS.get() {
        c.inc();
    }
}

#[inline]
pub fn inc_messages_sent() {
    if let Some(c) = MESSAGES_SENT.get() {
        c.inc();
    }
}

#[inline]
pub fn inc_messages_dropped() {
    if let Some(c) = MESSAGES_DROPPED.get() {
        c.inc();
    }
}

#[inline]
pub fn session_activated() {
    if let Some(g) = CONNECTED_SESSIONS.get() {
        g.inc();
    }
}

#[inline]
pub fn session_deactivated() {
    if let Some(g) = CONNECTED_SESSIONS.get() {
        g.dec();
    }
}

/// Record a session teardown.
#[inline]
pub fn record_eviction(reason: &str) {
    if let Some(c) = EVICTIONS.get() {
        c.with_label_values(&[reason]).inc();
    }
}

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

/// Record message fan-out (how many recipients received a broadcast).
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = MESSAGE_FANOUT.get() {
        h.observe(recipients as f64);
    }
}
