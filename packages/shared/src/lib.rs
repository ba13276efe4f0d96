//! Shared utilities for the TCP chat server and client.

pub mod logger;
pub mod time;
