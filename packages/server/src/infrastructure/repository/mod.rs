//! Repository 実装

pub mod inmemory;

pub use inmemory::{
    DEFAULT_HISTORY_CAPACITY, InMemoryClientRepository, InMemoryHistoryRepository,
    InMemoryRoomRepository,
};
