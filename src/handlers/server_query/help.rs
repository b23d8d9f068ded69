//! HELP command handler.
//!
//! Returns a one-line summary of every command.

use super::super::{Context, Handler, HandlerResult};
use async_trait::async_trait;
use chat_proto::Command;
use std::sync::OnceLock;

/// Static help text for commands.
const HELP_TOPICS: &[(&str, &str)] = &[
    ("NICK <nickname>", "change your nickname"),
    ("JOIN", "announce yourself again"),
    ("MSG <nickname> <message>", "private message another user"),
    ("LST", "list connected users"),
    ("PING", "measure server response time in ms"),
    ("HELP", "show this text"),
    ("QUIT", "leave the chat"),
];

fn help_text() -> &'static str {
    static TEXT: OnceLock<String> = OnceLock::new();
    TEXT.get_or_init(|| {
        HELP_TOPICS
            .iter()
            .map(|(usage, what)| format!("'{usage}' - {what}"))
            .collect::<Vec<_>>()
            .join(" : ")
    })
}

/// Handler for HELP command.
pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &Command<'_>) -> HandlerResult {
        ctx.reply(help_text());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_mentions_every_command() {
        let text = help_text();
        for word in ["NICK", "JOIN", "MSG", "LST", "PING", "HELP", "QUIT"] {
            assert!(text.contains(word), "help is missing {word}");
        }
        assert!(!text.contains('\n'));
    }
}
