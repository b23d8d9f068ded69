//! Free text broadcast.

use super::super::{Context, Handler, HandlerResult, misrouted};
use async_trait::async_trait;
use chat_proto::Command;
use tracing::trace;

/// Handler for any line that is not a command.
pub struct TextHandler;

#[async_trait]
impl Handler for TextHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &Command<'_>) -> HandlerResult {
        let Command::Text(text) = *cmd else {
            return Err(misrouted("TEXT", cmd));
        };

        let nick = ctx.nick();
        let recipients = ctx
            .matrix
            .router
            .broadcast_excluding(ctx.session.id(), &nick, text);
        trace!(recipients, "Chat line broadcast");
        Ok(())
    }
}
