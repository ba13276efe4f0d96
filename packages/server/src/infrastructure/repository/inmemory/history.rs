//! InMemory History Store 実装
//!
//! 全ルームのメッセージを到着順に 1 本のリングバッファで保持します。
//! 容量を超えると最も古いメッセージから破棄されます。

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, HistoryRepository, RoomName};

/// Default number of retained messages across all rooms.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// インメモリ History Store 実装
pub struct InMemoryHistoryRepository {
    entries: Mutex<VecDeque<(RoomName, ChatMessage)>>,
    capacity: usize,
}

impl InMemoryHistoryRepository {
    /// 容量を指定して作成（0 の場合は何も保持しない）
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY))),
            capacity,
        }
    }
}

impl Default for InMemoryHistoryRepository {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn append(&self, room: RoomName, message: ChatMessage) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().await;
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back((room, message));
    }

    async fn snapshot(&self, room: &RoomName) -> Vec<ChatMessage> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .filter(|(entry_room, _)| entry_room == room)
            .map(|(_, message)| message.clone())
            .collect()
    }

    async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.len()
    }
}
