//! NICK and JOIN handlers.

use super::super::{Context, Handler, HandlerError, HandlerResult, misrouted, validate_nickname};
use async_trait::async_trait;
use chat_proto::Command;
use tracing::info;

/// Handler for NICK command.
pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &Command<'_>) -> HandlerResult {
        let Command::Nick(new_nick) = *cmd else {
            return Err(misrouted("NICK", cmd));
        };

        validate_nickname(new_nick, ctx.matrix.config.limits.max_nick_len)
            .map_err(|why| HandlerError::ErroneousNickname(new_nick.to_owned(), why))?;

        let old_nick = ctx.matrix.registry.rename(ctx.session, new_nick)?;
        if old_nick != new_nick {
            info!(sid = %ctx.session.id(), old = %old_nick, new = %new_nick, "Nickname changed");
        }
        ctx.reply(format!("Nickname set to {new_nick}"));
        Ok(())
    }
}

/// Handler for JOIN command.
///
/// Repeats the caller's join notice to every Active session, the caller
/// included.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &Command<'_>) -> HandlerResult {
        let nick = ctx.nick();
        ctx.matrix.router.broadcast_all(&nick, "has joined the chat.");
        Ok(())
    }
}
