//! Command handler context and the handler trait.
//!
//! Defines the `Context<'a>` struct passed to all handlers.

use crate::state::{Matrix, Session};
use async_trait::async_trait;
use chat_proto::Command;
use std::sync::Arc;
use std::time::Instant;

pub use crate::error::{HandlerError, HandlerResult};

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The session that sent the command.
    pub session: &'a Arc<Session>,
    /// Shared server state.
    pub matrix: &'a Arc<Matrix>,
    /// When the line was read off the transport.
    pub received_at: Instant,
}

impl<'a> Context<'a> {
    pub fn new(session: &'a Arc<Session>, matrix: &'a Arc<Matrix>) -> Self {
        Self {
            session,
            matrix,
            received_at: Instant::now(),
        }
    }

    /// The caller's current nickname.
    pub fn nick(&self) -> String {
        self.session.nickname()
    }

    /// Send a SERVER message to the caller.
    #[inline]
    pub fn reply(&self, text: impl Into<String>) {
        self.matrix.router.reply(self.session, text);
    }
}

/// A command handler.
///
/// Handlers are looked up by [`Command::name`] and only ever receive the
/// variant they are registered for.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &Command<'_>) -> HandlerResult;
}

/// Error for a handler invoked with a command it was not registered for.
pub(crate) fn misrouted(expected: &str, cmd: &Command<'_>) -> HandlerError {
    HandlerError::Internal(format!("{expected} handler got {}", cmd.name()))
}
