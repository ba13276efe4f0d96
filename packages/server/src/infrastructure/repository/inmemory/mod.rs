//! InMemory Repository 実装
//!
//! 各構造体は自身の状態を `tokio::sync::Mutex` で保護します。

mod client;
mod history;
mod room;

pub use client::InMemoryClientRepository;
pub use history::{DEFAULT_HISTORY_CAPACITY, InMemoryHistoryRepository};
pub use room::InMemoryRoomRepository;
