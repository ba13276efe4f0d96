//! UseCase: メッセージ送信処理
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute()
//! - チャット行を ChatMessage に変換し、ブロードキャストキューへ積む
//!
//! ### なぜこのテストが必要か
//! - 読み込みループとブロードキャストを切り離すキューの振る舞い（満杯時は待つ、
//!   停止後は受け付けない）を保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム参加中のセッションからの送信
//! - 異常系：短すぎる行、ルーム未参加、キュー停止後

use std::sync::Arc;

use tcpchat_shared::time::Clock;
use tokio::sync::mpsc;

use crate::domain::{
    ChatMessage, ClientRepository, MessageContent, RoomRepository, SessionId, Timestamp,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    clients: Arc<dyn ClientRepository>,
    rooms: Arc<dyn RoomRepository>,
    /// ブロードキャストキュー（BroadcastRouter が受信側を持つ）
    queue: mpsc::Sender<ChatMessage>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        rooms: Arc<dyn RoomRepository>,
        queue: mpsc::Sender<ChatMessage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            clients,
            rooms,
            queue,
            clock,
        }
    }

    /// チャット行をブロードキャストキューへ積む
    ///
    /// Waits for free space when the queue is full, so a fast talker is slowed
    /// down instead of having messages dropped.
    pub async fn execute(&self, session_id: SessionId, line: &str) -> Result<(), SendMessageError> {
        let content = MessageContent::new(line).map_err(|_| SendMessageError::ContentTooShort)?;

        let room = self
            .rooms
            .current_room(session_id)
            .await
            .ok_or(SendMessageError::NotInRoom)?;
        let sender = self
            .clients
            .name_of(session_id)
            .await
            .ok_or(SendMessageError::NotRegistered)?;

        let message = ChatMessage::new(
            sender,
            content,
            session_id,
            room,
            Timestamp::new(self.clock.now_millis()),
        );
        self.queue
            .send(message)
            .await
            .map_err(|_| SendMessageError::QueueClosed)?;

        Ok(())
    }
}
