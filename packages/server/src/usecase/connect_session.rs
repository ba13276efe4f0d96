//! UseCase: セッション接続処理（表示名の登録）
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute()
//! - 表示名の検証・重複時のサフィックス付与・送信チャンネルの登録
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規セッションの名前登録
//! - 異常系：3 文字未満の名前（登録されず、チャンネルも登録されない）
//! - エッジケース：既に使われている名前

use std::sync::Arc;

use crate::domain::{ClientRepository, DisplayName, MessagePusher, PusherChannel, SessionId};

use super::error::ConnectError;

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    clients: Arc<dyn ClientRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectSessionUseCase {
    pub fn new(clients: Arc<dyn ClientRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            clients,
            message_pusher,
        }
    }

    /// 表示名を登録し、送信チャンネルを MessagePusher に登録する
    ///
    /// # Returns
    ///
    /// * `Ok(DisplayName)` - 最終的に割り当てられた表示名
    /// * `Err(ConnectError)` - 名前が不正（何も登録されない）
    pub async fn execute(
        &self,
        session_id: SessionId,
        requested_name: &str,
        sender: PusherChannel,
    ) -> Result<DisplayName, ConnectError> {
        let name = self.clients.register(session_id, requested_name).await?;
        self.message_pusher.register_client(session_id, sender).await;

        tracing::info!("Session {} registered as '{}'", session_id, name);
        Ok(name)
    }
}
