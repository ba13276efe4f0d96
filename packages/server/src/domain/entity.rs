//! エンティティ

use tcpchat_shared::time::format_timestamp;

use super::value_object::{DisplayName, MessageContent, RoomName, SessionId, Timestamp};

/// A chat line accepted from a session.
///
/// Immutable once constructed. `room` is the sender's room when the line was
/// accepted; the router falls back to it if the sender has left by the time
/// the message is dequeued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: DisplayName,
    pub content: MessageContent,
    pub origin: SessionId,
    pub room: RoomName,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(
        sender: DisplayName,
        content: MessageContent,
        origin: SessionId,
        room: RoomName,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            sender,
            content,
            origin,
            room,
            timestamp,
        }
    }

    /// Wire form: `[<timestamp>][<sender>]:<content>\n`
    pub fn to_line(&self) -> String {
        format!(
            "[{}][{}]:{}\n",
            format_timestamp(self.timestamp.value()),
            self.sender,
            self.content.as_str()
        )
    }
}

/// Result of a successful `RoomRepository::join`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Room the session was implicitly removed from, if any
    pub left: Option<LeaveOutcome>,
    pub joined: RoomName,
    /// Members of the joined room before the session arrived, in join order
    pub existing_members: Vec<SessionId>,
}

/// Result of removing a session from its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub room: RoomName,
    /// Members still in the room, in join order
    pub remaining_members: Vec<SessionId>,
    /// The room had no members left and was deleted
    pub room_deleted: bool,
}
