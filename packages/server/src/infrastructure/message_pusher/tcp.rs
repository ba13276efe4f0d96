//! TCP セッション向け MessagePusher 実装
//!
//! ## 責務
//!
//! - セッションごとの送信チャンネル（`PusherChannel`）を管理
//! - セッションへのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! ソケットへの実際の書き込みは UI 層の writer タスク（`ui::handler::session`）が行います。
//! この実装はチャンネルへ行を積むだけで待たないので、遅い受信者がいても他の受信者への
//! 配信やブロードキャストワーカーを止めません。キューが溢れた受信者はセッション側で切断されます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, PusherChannel, SessionId};

/// TCP セッション向け MessagePusher 実装
#[derive(Default)]
pub struct TcpMessagePusher {
    /// Key: session, Value: outbound line queue drained by the session's writer
    clients: Mutex<HashMap<SessionId, PusherChannel>>,
}

impl TcpMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for TcpMessagePusher {
    async fn register_client(&self, session_id: SessionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(session_id, sender);
        tracing::debug!("Session {} registered to MessagePusher", session_id);
    }

    async fn unregister_client(&self, session_id: SessionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(&session_id).is_some() {
            tracing::debug!("Session {} unregistered from MessagePusher", session_id);
        }
    }

    async fn push_to(&self, session_id: SessionId, content: &str) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(&session_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(session_id.to_string()))?;
        sender.push(content.to_string())?;
        tracing::debug!("Pushed message to session {}", session_id);

        Ok(())
    }

    async fn broadcast(&self, targets: &[SessionId], content: &str) {
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(target) {
                Some(sender) if sender.is_overflowed() => {
                    tracing::debug!("Session {} is being disconnected, skipping", target);
                }
                Some(sender) => {
                    // 一部の送信失敗は許容し、残りの受信者への配信を続ける
                    if let Err(e) = sender.push(content.to_string()) {
                        tracing::warn!("Failed to push message to session {}: {}", target, e);
                    }
                }
                None => {
                    tracing::warn!("Session {} not found during broadcast, skipping", target);
                }
            }
        }
    }
}
