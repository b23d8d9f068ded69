//! Server-to-client envelopes.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Username reserved for messages originated by the server itself.
pub const SERVER_USERNAME: &str = "SERVER";

/// Payload of the liveness probe, and the command a client echoes back.
pub const HEARTBEAT: &str = "HEARTBEAT";

/// One outbound chat or system message.
///
/// Serialized as `{"msg": ..., "username": ...}` on a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message text.
    pub msg: String,
    /// Sender as shown to the recipient.
    pub username: String,
}

impl Envelope {
    /// Create an envelope from an arbitrary sender.
    pub fn new(username: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            username: username.into(),
        }
    }

    /// Create a system message.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::new(SERVER_USERNAME, msg)
    }

    /// The liveness probe.
    pub fn heartbeat() -> Self {
        Self::server(HEARTBEAT)
    }

    /// Create a private message from `sender`, tagged so the recipient can
    /// tell it apart from broadcast text.
    pub fn private(sender: &str, msg: impl Into<String>) -> Self {
        Self::new(format!("{sender} (private)"), msg)
    }

    /// Whether the server originated this envelope.
    pub fn is_server(&self) -> bool {
        self.username == SERVER_USERNAME
    }

    /// Whether this is a liveness probe.
    pub fn is_heartbeat(&self) -> bool {
        self.is_server() && self.msg == HEARTBEAT
    }

    /// Encode as a single JSON object without the trailing newline.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode one JSON line. Surrounding whitespace is ignored.
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}
