//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{DomainError, RegistryError};

/// セッション接続（名前登録）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("name '{0}' is too short")]
    NameTooShort(String),

    #[error("invalid name: {0}")]
    InvalidName(DomainError),

    #[error("session is already closed")]
    SessionClosed,
}

impl From<RegistryError> for ConnectError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::NameTooShort(name) => Self::NameTooShort(name),
            RegistryError::InvalidName(e) => Self::InvalidName(e),
            RegistryError::NotRegistered => Self::SessionClosed,
        }
    }
}

/// ルーム参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("already in room {0}")]
    AlreadyInRoom(String),

    #[error("invalid room name: {0}")]
    InvalidRoomName(#[from] DomainError),
}

/// 名前変更のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("no new name given")]
    MissingName,

    #[error("session is not registered")]
    NotRegistered,
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("message content is too short")]
    ContentTooShort,

    #[error("session is not in a room")]
    NotInRoom,

    #[error("session is not registered")]
    NotRegistered,

    /// The broadcast queue was closed by shutdown
    #[error("broadcast queue is closed")]
    QueueClosed,
}
