//! LST command handler.

use super::super::{Context, Handler, HandlerResult};
use async_trait::async_trait;
use chat_proto::Command;

/// Handler for LST command.
///
/// Replies with every registered nickname, sorted, joined by `", "`.
pub struct ListHandler;

#[async_trait]
impl Handler for ListHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &Command<'_>) -> HandlerResult {
        let mut names = ctx.matrix.registry.nicknames();
        names.sort_unstable();
        ctx.reply(names.join(", "));
        Ok(())
    }
}
