//! CLI client for the tcpchat server.
//!
//! Prints everything the server sends and forwards typed lines to it.

pub mod error;
pub mod input;
pub mod session;

pub use error::ClientError;
pub use session::{SessionEnd, run_client_session};
