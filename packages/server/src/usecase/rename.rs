//! UseCase: 名前変更処理
//!
//! 名前変更では一意性を再確認しません（登録時の重複回避のみ）。
//! そのため名前変更後に同じ表示名のセッションが複数存在し得ます。

use std::sync::Arc;

use crate::domain::{ClientRepository, DisplayName, MessagePusher, RoomRepository, SessionId};

use super::{error::RenameError, gate::DeliveryGate, notice::NoticeFormatter};

/// 名前変更のユースケース
pub struct RenameUseCase {
    clients: Arc<dyn ClientRepository>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    gate: Arc<DeliveryGate>,
}

impl RenameUseCase {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        gate: Arc<DeliveryGate>,
    ) -> Self {
        Self {
            clients,
            rooms,
            message_pusher,
            gate,
        }
    }

    /// 名前を変更し、ルームの他のメンバーに通知、本人に確認を送る
    ///
    /// # Returns
    ///
    /// * `Ok((old, new))` - 変更前と変更後の表示名
    /// * `Err(RenameError)` - 新しい名前が空、またはセッションが未登録
    pub async fn execute(
        &self,
        session_id: SessionId,
        new_name: Option<&str>,
    ) -> Result<(DisplayName, DisplayName), RenameError> {
        let new_name = new_name
            .and_then(|raw| DisplayName::new(raw).ok())
            .ok_or(RenameError::MissingName)?;

        let _gate = self.gate.enter().await;

        let (old_name, new_name) = self
            .clients
            .rename(session_id, new_name)
            .await
            .map_err(|_| RenameError::NotRegistered)?;

        if let Some(room) = self.rooms.current_room(session_id).await {
            let targets: Vec<SessionId> = self
                .rooms
                .list_members(&room)
                .await
                .unwrap_or_default()
                .into_iter()
                .filter(|member| *member != session_id)
                .collect();
            self.message_pusher
                .broadcast(&targets, &NoticeFormatter::renamed(&old_name, &new_name))
                .await;
        }

        if let Err(e) = self
            .message_pusher
            .push_to(session_id, &NoticeFormatter::rename_confirmed(&new_name))
            .await
        {
            tracing::debug!("Could not confirm rename to session {}: {}", session_id, e);
        }
        tracing::info!("Session {} renamed '{}' -> '{}'", session_id, old_name, new_name);

        Ok((old_name, new_name))
    }
}
