//! Multi-room TCP chat relay library.
//!
//! This library provides the server core: connection admission, session
//! lifecycle, room membership, history replay and room broadcast routing.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
