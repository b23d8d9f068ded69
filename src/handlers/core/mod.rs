//! Core handler infrastructure.
//!
//! This module contains the fundamental types for the command handler
//! system: the per-command [`Context`], the [`Handler`] trait, and the
//! [`Dispatcher`] that routes parsed lines to handlers.

pub mod context;
pub mod dispatcher;

// Re-export commonly used types
pub use context::{Context, Handler, HandlerError, HandlerResult};
pub(crate) use context::misrouted;
pub use dispatcher::Dispatcher;
