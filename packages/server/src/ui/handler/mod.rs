//! Per-connection handlers.

pub mod command;
pub mod session;

pub use session::{handle_connection, reject_connection};
