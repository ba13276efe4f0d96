//! UseCase: ルーム退出処理
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute()
//! - 退出の本人への確認通知と、残りのメンバーへの退出通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：メンバーが残るルームからの退出
//! - エッジケース：最後のメンバーの退出（ルーム削除）
//! - 異常系：どのルームにも属していないセッションの退出

use std::sync::Arc;

use crate::domain::{
    ClientRepository, DisplayName, LeaveOutcome, MessagePusher, RoomError, RoomRepository,
    SessionId,
};

use super::{gate::DeliveryGate, notice::NoticeFormatter};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    rooms: Arc<dyn RoomRepository>,
    clients: Arc<dyn ClientRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    gate: Arc<DeliveryGate>,
}

impl LeaveRoomUseCase {
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

    /// 現在のルームから退出する
    ///
    /// # Returns
    ///
    /// * `Ok(LeaveOutcome)` - 退出したルームと残りのメンバー
    /// * `Err(RoomError::NotInRoom)` - どのルームにも属していない
    pub async fn execute(&self, session_id: SessionId) -> Result<LeaveOutcome, RoomError> {
        let _gate = self.gate.enter().await;

        let name = self.clients.name_of(session_id).await;
        let outcome = self
            .rooms
            .leave(session_id)
            .await
            .ok_or(RoomError::NotInRoom)?;
        announce_departure(
            self.message_pusher.as_ref(),
            session_id,
            name.as_ref(),
            &outcome,
            true,
        )
        .await;

        Ok(outcome)
    }
}

/// 退出を残りのメンバーへ通知する（必要なら本人にも確認を送る）
///
/// Must be called while the delivery gate is held.
pub(crate) async fn announce_departure(
    message_pusher: &dyn MessagePusher,
    session_id: SessionId,
    name: Option<&DisplayName>,
    outcome: &LeaveOutcome,
    confirm_to_self: bool,
) {
    if confirm_to_self {
        if let Err(e) = message_pusher
            .push_to(session_id, &NoticeFormatter::you_left(&outcome.room))
            .await
        {
            tracing::debug!("Could not confirm leave to session {}: {}", session_id, e);
        }
    }

    if let Some(name) = name {
        message_pusher
            .broadcast(&outcome.remaining_members, &NoticeFormatter::member_left(name))
            .await;
    }

    if outcome.room_deleted {
        tracing::info!("Room '{}' is empty and was removed", outcome.room);
    }
}
