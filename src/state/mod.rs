//! State management module.
//!
//! Contains the Matrix (shared server state), the session registry, and the
//! per-connection session record.

mod matrix;
mod registry;
pub(crate) mod session;
mod uid;

pub use matrix::Matrix;
pub use registry::{Registry, RegistryError};
pub use session::{CloseReason, Phase, Session};
pub use uid::{SessionId, SessionIdGenerator};
