//! MSG handler.

use super::super::{Context, Handler, HandlerResult, misrouted};
use async_trait::async_trait;
use chat_proto::{Command, Envelope};

/// Handler for MSG command.
///
/// Delivers to one Active session, tagged `<sender> (private)`. The sender
/// gets no echo.
pub struct PrivateMessageHandler;

#[async_trait]
impl Handler for PrivateMessageHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &Command<'_>) -> HandlerResult {
        let Command::Msg { target, text } = *cmd else {
            return Err(misrouted("MSG", cmd));
        };

        let envelope = Envelope::private(&ctx.nick(), text);
        ctx.matrix.router.unicast(target, envelope)?;
        Ok(())
    }
}
