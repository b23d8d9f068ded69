//! Client-to-server command lines.
//!
//! Commands are recognized by a case-sensitive first token. Anything that
//! does not start with a known command word is free text.

use std::fmt;

use thiserror::Error;

/// A parsed client line, borrowing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `NICK <name>`
    Nick(&'a str),
    /// `JOIN`
    Join,
    /// `QUIT`
    Quit,
    /// `MSG <nick> <text>`
    Msg {
        /// Recipient nickname.
        target: &'a str,
        /// Message body, may contain spaces.
        text: &'a str,
    },
    /// `LST`
    List,
    /// `HELP`
    Help,
    /// `PING`
    Ping,
    /// `HEARTBEAT`
    Heartbeat,
    /// Any other line, broadcast verbatim.
    Text(&'a str),
}

/// A recognized command with the wrong number of arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Wrong argument count for `command`.
    #[error("bad arity for {command}")]
    BadArity {
        /// The command word as sent.
        command: &'static str,
    },
}

impl ParseError {
    /// Name of the command that failed to parse.
    pub fn command(&self) -> &'static str {
        match self {
            Self::BadArity { command } => command,
        }
    }

    /// Usage line shown to the user.
    pub fn usage(&self) -> &'static str {
        usage_for(self.command())
    }
}

/// Usage text for a command word.
pub fn usage_for(command: &str) -> &'static str {
    match command {
        "NICK" => "Usage: NICK <nickname>",
        "MSG" => "Usage: MSG <nickname> <message>",
        "JOIN" => "Usage: JOIN",
        "QUIT" => "Usage: QUIT",
        "LST" => "Usage: LST",
        "HELP" => "Usage: HELP",
        "PING" => "Usage: PING",
        "HEARTBEAT" => "Usage: HEARTBEAT",
        _ => "Type HELP for a list of commands",
    }
}

/// Split off the first whitespace-delimited token.
///
/// Returns the token and the remainder with leading whitespace removed.
fn split_token(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

impl<'a> Command<'a> {
    /// Parse one line (without its newline).
    ///
    /// Callers skip blank lines before parsing; a blank line parses as empty
    /// [`Command::Text`].
    pub fn parse(line: &'a str) -> Result<Self, ParseError> {
        let (head, rest) = split_token(line.trim());

        let bare = |cmd: Command<'a>, name: &'static str| {
            if rest.is_empty() {
                Ok(cmd)
            } else {
                Err(ParseError::BadArity { command: name })
            }
        };

        match head {
            "NICK" => {
                let (name, extra) = split_token(rest);
                if name.is_empty() || !extra.is_empty() {
                    return Err(ParseError::BadArity { command: "NICK" });
                }
                Ok(Command::Nick(name))
            }
            "MSG" => {
                let (target, text) = split_token(rest);
                if target.is_empty() || text.is_empty() {
                    return Err(ParseError::BadArity { command: "MSG" });
                }
                Ok(Command::Msg { target, text })
            }
            "JOIN" => bare(Command::Join, "JOIN"),
            "QUIT" => bare(Command::Quit, "QUIT"),
            "LST" => bare(Command::List, "LST"),
            "HELP" => bare(Command::Help, "HELP"),
            "PING" => bare(Command::Ping, "PING"),
            "HEARTBEAT" => bare(Command::Heartbeat, "HEARTBEAT"),
            _ => Ok(Command::Text(line)),
        }
    }

    /// Command word used for dispatch, metrics, and logs.
    ///
    /// Free text reports as `TEXT`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nick(_) => "NICK",
            Self::Join => "JOIN",
            Self::Quit => "QUIT",
            Self::Msg { .. } => "MSG",
            Self::List => "LST",
            Self::Help => "HELP",
            Self::Ping => "PING",
            Self::Heartbeat => "HEARTBEAT",
            Self::Text(_) => "TEXT",
        }
    }
}

impl fmt::Display for Command<'_> {
    /// Render as the line a client would send.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nick(name) => write!(f, "NICK {name}"),
            Self::Msg { target, text } => write!(f, "MSG {target} {text}"),
            Self::Text(text) => f.write_str(text),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_commands() {
        assert_eq!(Command::parse("JOIN"), Ok(Command::Join));
        assert_eq!(Command::parse("QUIT"), Ok(Command::Quit));
        assert_eq!(Command::parse("LST"), Ok(Command::List));
        assert_eq!(Command::parse("HELP"), Ok(Command::Help));
        assert_eq!(Command::parse("PING"), Ok(Command::Ping));
        assert_eq!(Command::parse("HEARTBEAT"), Ok(Command::Heartbeat));
        assert_eq!(Command::parse("  HEARTBEAT \r"), Ok(Command::Heartbeat));
    }

    #[test]
    fn nick_requires_exactly_one_argument() {
        assert_eq!(Command::parse("NICK carol"), Ok(Command::Nick("carol")));
        assert_eq!(Command::parse("NICK   carol  "), Ok(Command::Nick("carol")));

        let err = Command::parse("NICK").unwrap_err();
        assert_eq!(err.command(), "NICK");
        assert_eq!(err.usage(), "Usage: NICK <nickname>");
        assert!(Command::parse("NICK a b").is_err());
    }

    #[test]
    fn msg_keeps_spaces_in_body() {
        assert_eq!(
            Command::parse("MSG bob hello there  friend"),
            Ok(Command::Msg {
                target: "bob",
                text: "hello there  friend"
            })
        );
        assert_eq!(
            Command::parse("MSG bob").unwrap_err().usage(),
            "Usage: MSG <nickname> <message>"
        );
        assert!(Command::parse("MSG").is_err());
    }

    #[test]
    fn bare_commands_reject_arguments() {
        let err = Command::parse("LST everyone").unwrap_err();
        assert_eq!(err.usage(), "Usage: LST");
        assert!(Command::parse("QUIT now").is_err());
    }

    #[test]
    fn commands_are_case_sensitive() {
        assert_eq!(Command::parse("quit"), Ok(Command::Text("quit")));
        assert_eq!(Command::parse("Nick bob"), Ok(Command::Text("Nick bob")));
    }

    #[test]
    fn free_text_is_kept_verbatim() {
        assert_eq!(
            Command::parse("hello  world "),
            Ok(Command::Text("hello  world "))
        );
        assert_eq!(Command::parse("NICKNAME x"), Ok(Command::Text("NICKNAME x")));
    }

    #[test]
    fn display_round_trips_for_client_use() {
        let cmd = Command::Msg {
            target: "bob",
            text: "hi there",
        };
        assert_eq!(cmd.to_string(), "MSG bob hi there");
        assert_eq!(Command::List.to_string(), "LST");
        assert_eq!(Command::Nick("x").to_string(), "NICK x");
    }
}
