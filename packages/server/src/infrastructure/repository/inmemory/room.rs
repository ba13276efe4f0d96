//! InMemory Room Directory 実装
//!
//! ルーム → メンバー（参加順）と、セッション → 所属ルームの 2 つの対応表を
//! 1 つのロックでまとめて保護します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{JoinOutcome, LeaveOutcome, RoomError, RoomName, RoomRepository, SessionId};

#[derive(Default)]
struct Directory {
    /// Key: room, Value: members in join order
    rooms: HashMap<RoomName, Vec<SessionId>>,
    /// Key: session, Value: the single room it belongs to
    memberships: HashMap<SessionId, RoomName>,
}

impl Directory {
    fn remove_member(&mut self, session_id: SessionId) -> Option<LeaveOutcome> {
        let room = self.memberships.remove(&session_id)?;
        let members = self.rooms.entry(room.clone()).or_default();
        members.retain(|member| *member != session_id);
        let remaining_members = members.clone();

        let room_deleted = remaining_members.is_empty();
        if room_deleted {
            self.rooms.remove(&room);
        }

        Some(LeaveOutcome {
            room,
            remaining_members,
            room_deleted,
        })
    }
}

/// インメモリ Room Directory 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    directory: Mutex<Directory>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn join(&self, session_id: SessionId, room: RoomName) -> JoinOutcome {
        let mut directory = self.directory.lock().await;

        let left = directory.remove_member(session_id);

        let members = directory.rooms.entry(room.clone()).or_default();
        let existing_members = members.clone();
        members.push(session_id);
        directory.memberships.insert(session_id, room.clone());

        JoinOutcome {
            left,
            joined: room,
            existing_members,
        }
    }

    async fn leave(&self, session_id: SessionId) -> Option<LeaveOutcome> {
        let mut directory = self.directory.lock().await;
        directory.remove_member(session_id)
    }

    async fn current_room(&self, session_id: SessionId) -> Option<RoomName> {
        let directory = self.directory.lock().await;
        directory.memberships.get(&session_id).cloned()
    }

    async fn list_rooms(&self) -> Vec<RoomName> {
        let directory = self.directory.lock().await;
        let mut rooms: Vec<RoomName> = directory.rooms.keys().cloned().collect();
        rooms.sort();
        rooms
    }

    async fn list_members(&self, room: &RoomName) -> Result<Vec<SessionId>, RoomError> {
        let directory = self.directory.lock().await;
        directory
            .rooms
            .get(room)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(room.as_str().to_string()))
    }
}
