//! Chat command handlers.
//!
//! This module contains the Handler trait and the dispatcher that routes
//! each inbound line to the appropriate handler.
//!
//! Handlers receive a `Command<'_>` that borrows directly from the line
//! read off the transport; arguments are `&str` slices.

mod connection;
mod core;
mod helpers;
mod messaging;
mod server_query;

pub(crate) use self::core::misrouted;
pub use self::core::{Context, Dispatcher, Handler, HandlerError, HandlerResult};
pub use connection::{Negotiation, send_greeting, submit_nickname};
pub use helpers::validate_nickname;
