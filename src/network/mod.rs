//! Network module.
//!
//! Contains the Gateway (TCP listener), the per-client Connection task, and
//! the heartbeat supervisor that keeps Active sessions honest.

mod connection;
mod gateway;
mod heartbeat;

pub use connection::Connection;
pub use gateway::Gateway;
pub use heartbeat::HeartbeatSupervisor;
