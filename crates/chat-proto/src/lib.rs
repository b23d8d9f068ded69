//! # chat-proto
//!
//! Wire protocol for the chatd line chat server.
//!
//! The protocol is asymmetric:
//!
//! - **client → server**: plain UTF-8 text lines. A line is either a command
//!   (`NICK`, `JOIN`, `QUIT`, `MSG`, `LST`, `HELP`, `PING`, `HEARTBEAT`) or
//!   free text to broadcast.
//! - **server → client**: one JSON object per line, `{"msg": ..., "username": ...}`.
//!   The reserved username `SERVER` marks system messages, including the
//!   `HEARTBEAT` liveness probe.
//!
//! ## Quick Start
//!
//! ```rust
//! use chat_proto::{Command, Envelope};
//!
//! let cmd = Command::parse("MSG bob see you at noon").unwrap();
//! assert_eq!(cmd, Command::Msg { target: "bob", text: "see you at noon" });
//!
//! let probe = Envelope::server("HEARTBEAT");
//! assert!(probe.is_heartbeat());
//! assert_eq!(probe.to_json().unwrap(), r#"{"msg":"HEARTBEAT","username":"SERVER"}"#);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod envelope;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;

pub use self::command::{Command, ParseError};
pub use self::envelope::{Envelope, HEARTBEAT, SERVER_USERNAME};
pub use self::error::ProtocolError;
#[cfg(feature = "tokio")]
pub use self::line::{ClientCodec, DEFAULT_MAX_LINE_LEN, Frame, LineCodec, ServerCodec};
