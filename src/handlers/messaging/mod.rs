//! Chat message handlers.
//!
//! Free text is broadcast to everyone but the sender; `MSG` goes to exactly
//! one named session.

mod private;
mod text;

pub use private::PrivateMessageHandler;
pub use text::TextHandler;
