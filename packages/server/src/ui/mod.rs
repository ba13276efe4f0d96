//! TCP chat server implementation.

pub mod admission;
pub mod config;
mod handler;
mod server;
pub mod shutdown;
mod signal;
pub mod state;

pub use admission::{AdmissionController, AdmissionError, AdmissionPermit};
pub use config::ServerConfig;
pub use server::{Server, ServerError};
pub use shutdown::ShutdownCoordinator;
pub use signal::shutdown_signal;
