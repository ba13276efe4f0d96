//! UseCase: セッション切断処理
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute()
//! - ルームへの退出通知 → ルームからの削除 → 登録解除 → 送信チャンネルの破棄
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルームに参加中のセッションの切断
//! - エッジケース：同じセッションの切断処理が 2 回呼ばれる（2 回目は何もしない）

use std::sync::Arc;

use crate::domain::{
    ClientRepository, DisplayName, MessagePusher, RoomName, RoomRepository, SessionId,
};

use super::{gate::DeliveryGate, leave_room::announce_departure};

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// Registry entry that was removed
    pub name: Option<DisplayName>,
    /// Room membership that was removed
    pub left_room: Option<RoomName>,
}

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    rooms: Arc<dyn RoomRepository>,
    clients: Arc<dyn ClientRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    gate: Arc<DeliveryGate>,
}

impl DisconnectSessionUseCase {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        clients: Arc<dyn ClientRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        gate: Arc<DeliveryGate>,
    ) -> Self {
        Self {
            rooms,
            clients,
            message_pusher,
            gate,
        }
    }

    /// セッションの共有状態を全て片付ける
    ///
    /// Dropping the registered channel lets the session's writer finish, which
    /// closes the connection. Calling this again for the same session is a no-op.
    pub async fn execute(&self, session_id: SessionId) -> DisconnectOutcome {
        let name = self.clients.name_of(session_id).await;

        let left_room = {
            let _gate = self.gate.enter().await;
            let left = self.rooms.leave(session_id).await;
            if let Some(outcome) = &left {
                announce_departure(
                    self.message_pusher.as_ref(),
                    session_id,
                    name.as_ref(),
                    outcome,
                    false,
                )
                .await;
            }
            left.map(|outcome| outcome.room)
        };

        let name = self.clients.unregister(session_id).await;
        self.message_pusher.unregister_client(session_id).await;

        DisconnectOutcome { name, left_room }
    }
}
