//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクトのバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("room name must not be empty")]
    EmptyRoomName,

    #[error("message content is too short to broadcast")]
    ContentTooShort,
}

/// Client Registry のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Requested name is shorter than the registration minimum
    #[error("name '{0}' is too short")]
    NameTooShort(String),

    #[error("invalid name: {0}")]
    InvalidName(#[from] DomainError),

    #[error("session is not registered")]
    NotRegistered,
}

/// Room Directory のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room {0} does not exist.")]
    RoomNotFound(String),

    #[error("session is not in a room")]
    NotInRoom,
}

/// メッセージ送信（通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    /// The session's outbound queue was full
    #[error("outbound queue is full")]
    Overflowed,
}
