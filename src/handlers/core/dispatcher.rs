//! Command table and dispatch.
//!
//! The `Dispatcher` parses each inbound line and hands it to the handler
//! registered for its command word, inside a `chat.command` tracing span and
//! with latency and error metrics recorded.

use super::context::{Context, Handler, HandlerError, HandlerResult};
use crate::handlers::{
    connection::{HeartbeatHandler, JoinHandler, NickHandler, PingHandler, QuitHandler},
    messaging::{PrivateMessageHandler, TextHandler},
    server_query::{HelpHandler, ListHandler},
};
use crate::metrics;
use crate::telemetry::{CommandTimer, spans};
use chat_proto::Command;
use std::collections::HashMap;
use tracing::{Instrument, debug};

/// Table of command handlers.
pub struct Dispatcher {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Create a dispatcher with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Connection handlers
        handlers.insert("NICK", Box::new(NickHandler));
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));
        handlers.insert("PING", Box::new(PingHandler));
        handlers.insert("HEARTBEAT", Box::new(HeartbeatHandler));

        // Messaging handlers
        handlers.insert("MSG", Box::new(PrivateMessageHandler));
        handlers.insert("TEXT", Box::new(TextHandler));

        // Server query handlers
        handlers.insert("LST", Box::new(ListHandler));
        handlers.insert("HELP", Box::new(HelpHandler));

        Self { handlers }
    }

    /// Parse one line from an Active session and run its handler.
    ///
    /// Blank lines are ignored. Arity errors come back as
    /// [`HandlerError::BadArity`]; the caller turns errors into replies.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, line: &str) -> HandlerResult {
        if line.trim().is_empty() {
            return Ok(());
        }

        let cmd = match Command::parse(line) {
            Ok(cmd) => cmd,
            Err(e) => {
                metrics::record_command_error(e.command(), "bad_arity");
                debug!(command = e.command(), "Malformed command");
                return Err(e.into());
            }
        };

        let name = cmd.name();
        let Some(handler) = self.handlers.get(name) else {
            return Err(HandlerError::Internal(format!("no handler for {name}")));
        };

        let span = spans::command(name, &ctx.session.id().to_string(), &ctx.nick());
        let _timer = CommandTimer::new(name);

        let result = handler.handle(ctx, &cmd).instrument(span).await;

        if let Err(ref e) = result
            && !matches!(e, HandlerError::Quit)
        {
            metrics::record_command_error(name, e.error_code());
            debug!(command = name, error = %e, "Command error");
        }

        result
    }
}
