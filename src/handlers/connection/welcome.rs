//! Greeting and nickname negotiation.
//!
//! Before a session is Active every non-blank line is a nickname
//! submission. `NICK <name>` is accepted as well as a bare name. Other
//! command words are turned away with a prompt, and `HEARTBEAT` only
//! refreshes liveness.

use super::super::validate_nickname;
use crate::state::{Matrix, RegistryError, Session};
use chat_proto::Command;
use std::sync::Arc;
use tracing::debug;

/// What a negotiation line led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    /// Blank line; nothing sent.
    Ignored,
    /// Rejected with an explanation; still awaiting a nickname.
    Retry,
    /// Registered and announced; the session is now Active.
    Registered,
    /// Client asked to leave, or the session closed underneath us.
    Quit,
}

/// Send the greeting that opens negotiation.
pub fn send_greeting(matrix: &Matrix, session: &Session) {
    let name = &matrix.config.server.name;
    matrix
        .router
        .reply(session, format!("Welcome to {name}. Please enter a nickname:"));
}

/// Handle one line from a session awaiting its nickname.
pub fn submit_nickname(matrix: &Matrix, session: &Arc<Session>, line: &str) -> Negotiation {
    let line = line.trim();
    if line.is_empty() {
        return Negotiation::Ignored;
    }

    let nick = match Command::parse(line) {
        Ok(Command::Quit) => return Negotiation::Quit,
        Ok(Command::Heartbeat) => {
            session.touch();
            return Negotiation::Ignored;
        }
        Ok(Command::Nick(name)) => name,
        Ok(Command::Text(_)) => line,
        Ok(cmd) => return prompt_first(matrix, session, cmd.name()),
        Err(e) => return prompt_first(matrix, session, e.command()),
    };

    if let Err(why) = validate_nickname(nick, matrix.config.limits.max_nick_len) {
        debug!(sid = %session.id(), reason = why, "Nickname rejected");
        matrix.router.reply(
            session,
            format!("Invalid nickname ({why}). Please choose another one:"),
        );
        return Negotiation::Retry;
    }

    match matrix.activate(session, nick) {
        Ok(()) => Negotiation::Registered,
        Err(RegistryError::NameTaken(_)) => {
            matrix.router.reply(
                session,
                "Sorry, that nickname is already taken. Please choose another one:",
            );
            Negotiation::Retry
        }
        Err(e) => {
            debug!(sid = %session.id(), error = %e, "Registration abandoned");
            Negotiation::Quit
        }
    }
}

fn prompt_first(matrix: &Matrix, session: &Session, command: &str) -> Negotiation {
    debug!(sid = %session.id(), command, "Command before nickname");
    matrix.router.reply(
        session,
        format!("{command} needs a nickname first. Please enter a nickname:"),
    );
    Negotiation::Retry
}
