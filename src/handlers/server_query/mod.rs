//! Server query handlers.
//!
//! Handles LST and HELP.

mod help;
mod list;

pub use help::HelpHandler;
pub use list::ListHandler;
