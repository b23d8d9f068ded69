//! QUIT handler.

use super::super::{Context, Handler, HandlerError, HandlerResult};
use async_trait::async_trait;
use chat_proto::Command;

/// Handler for QUIT command.
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &Command<'_>) -> HandlerResult {
        tracing::info!(
            sid = %ctx.session.id(),
            nick = %ctx.nick(),
            "Client quit"
        );

        // Signal quit by returning Quit error that connection loop will handle
        Err(HandlerError::Quit)
    }
}
