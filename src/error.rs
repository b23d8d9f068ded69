//! Unified error handling for chatd.
//!
//! Handler errors carry everything needed to produce the SERVER reply the
//! affected user sees, plus a stable code for metrics labeling.

use chat_proto::{Envelope, ParseError};
use thiserror::Error;

use crate::router::RouteError;
use crate::state::RegistryError;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("bad arity for {}", .0.command())]
    BadArity(#[from] ParseError),

    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    #[error("erroneous nickname {0}: {1}")]
    ErroneousNickname(String, &'static str),

    #[error("no such nick: {0}")]
    NoSuchNick(String),

    #[error("not registered")]
    NotRegistered,

    /// End the session cleanly.
    #[error("client quit")]
    Quit,

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadArity(_) => "bad_arity",
            Self::NicknameInUse(_) => "nickname_in_use",
            Self::ErroneousNickname(..) => "erroneous_nickname",
            Self::NoSuchNick(_) => "no_such_nick",
            Self::NotRegistered => "not_registered",
            Self::Quit => "quit",
            Self::Internal(_) => "internal_error",
        }
    }

    /// The SERVER message shown to the user who caused the error.
    ///
    /// Returns `None` for errors that don't warrant a client-visible reply.
    pub fn to_reply(&self) -> Option<Envelope> {
        let text = match self {
            Self::BadArity(e) => e.usage().to_string(),
            Self::NicknameInUse(_) => "That name is already taken.".to_string(),
            Self::ErroneousNickname(_, why) => format!("Invalid nickname ({why})."),
            Self::NoSuchNick(nick) => format!("User {nick} not found"),
            Self::NotRegistered => "You must choose a nickname first.".to_string(),

            // These errors don't get client-visible replies
            Self::Quit => return None,
            Self::Internal(_) => return None,
        };
        Some(Envelope::server(text))
    }
}

impl From<RouteError> for HandlerError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::NoSuchNick(nick) => Self::NoSuchNick(nick),
        }
    }
}

impl From<RegistryError> for HandlerError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NameTaken(nick) => Self::NicknameInUse(nick),
            RegistryError::NotRegistered => Self::NotRegistered,
            RegistryError::SessionClosed => Self::Quit,
            other @ RegistryError::AlreadyRegistered => Self::Internal(other.to_string()),
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
