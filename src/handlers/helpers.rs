//! Helper functions shared by command handlers.

use chat_proto::SERVER_USERNAME;

/// Words the command parser claims; a nickname equal to one would be
/// unreachable as a bare line.
const COMMAND_WORDS: &[&str] = &[
    "NICK", "MSG", "JOIN", "QUIT", "LST", "HELP", "PING", "HEARTBEAT",
];

/// Check a requested nickname against the naming rules.
///
/// Returns a short reason on rejection, suitable for showing to the user.
pub fn validate_nickname(nick: &str, max_len: usize) -> Result<(), &'static str> {
    if nick.is_empty() {
        return Err("empty");
    }
    if nick.chars().count() > max_len {
        return Err("too long");
    }
    if nick.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("no spaces or control characters");
    }
    if nick.eq_ignore_ascii_case(SERVER_USERNAME) || COMMAND_WORDS.contains(&nick) {
        return Err("reserved");
    }
    Ok(())
}
