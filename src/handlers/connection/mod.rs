//! Connection handlers.
//!
//! Handles NICK, JOIN, PING, HEARTBEAT, QUIT commands, plus the nickname
//! negotiation that precedes them.

mod nick;
mod ping;
mod quit;
mod welcome;

pub use nick::{JoinHandler, NickHandler};
pub use ping::{HeartbeatHandler, PingHandler};
pub use quit::QuitHandler;
pub use welcome::{Negotiation, send_greeting, submit_nickname};
