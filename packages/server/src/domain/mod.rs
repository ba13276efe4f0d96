//! Domain layer
//!
//! チャットリレーのドメインモデル（値オブジェクト・エンティティ）と、
//! ドメイン層が必要とするインターフェース（trait）を定義します。

pub mod entity;
pub mod error;
pub mod history_sink;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, JoinOutcome, LeaveOutcome};
pub use error::{DomainError, MessagePushError, RegistryError, RoomError};
pub use history_sink::HistorySink;
#[cfg(test)]
pub use history_sink::MockHistorySink;
pub use message_pusher::{DEFAULT_OUTBOUND_HEADROOM, MessagePusher, PusherChannel};
pub use repository::{ClientRepository, HistoryRepository, RoomRepository};
pub use value_object::{DisplayName, MessageContent, RoomName, SessionId, Timestamp};
