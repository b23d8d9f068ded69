//! PING and HEARTBEAT handlers.

use super::super::{Context, Handler, HandlerResult};
use async_trait::async_trait;
use chat_proto::Command;
use tracing::trace;

/// Handler for PING command.
///
/// Replies `PONG`, then the time spent handling the request.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &Command<'_>) -> HandlerResult {
        ctx.reply("PONG");
        let elapsed = ctx.received_at.elapsed().as_millis();
        ctx.reply(format!("Ping: {elapsed} ms"));
        Ok(())
    }
}

/// Handler for HEARTBEAT command.
///
/// Refreshes the session's liveness timestamp. No reply.
pub struct HeartbeatHandler;

#[async_trait]
impl Handler for HeartbeatHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &Command<'_>) -> HandlerResult {
        ctx.session.touch();
        trace!(sid = %ctx.session.id(), "Heartbeat received");
        Ok(())
    }
}
