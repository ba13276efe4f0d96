//! MessagePusher trait 定義
//!
//! セッションへのメッセージ送信（通知）のインターフェース。
//! 接続ごとの書き込みは、このチャンネルの受信側を持つ writer タスクだけが行います。

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use super::{error::MessagePushError, value_object::SessionId};

/// Lines a session may have waiting for its writer beyond a full history replay.
pub const DEFAULT_OUTBOUND_HEADROOM: usize = 256;

/// Outbound line queue of one session.
///
/// Lines pushed through the same channel reach the peer in push order. The
/// queue is bounded and pushing never waits: a push that finds it full marks
/// the channel overflowed, and the session owning it is expected to tear down.
#[derive(Debug, Clone)]
pub struct PusherChannel {
    lines: mpsc::Sender<String>,
    overflowed: CancellationToken,
}

impl PusherChannel {
    /// Creates a channel holding at most `capacity` lines, and its receiving end.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (lines, rx) = mpsc::channel(capacity.max(1));
        let channel = Self {
            lines,
            overflowed: CancellationToken::new(),
        };
        (channel, rx)
    }

    pub fn push(&self, line: String) -> Result<(), MessagePushError> {
        match self.lines.try_send(line) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.overflowed.cancel();
                Err(MessagePushError::Overflowed)
            }
            Err(TrySendError::Closed(_)) => {
                Err(MessagePushError::PushFailed("writer closed".to_string()))
            }
        }
    }

    /// Resolves once a push has found the queue full.
    pub async fn overflowed(&self) {
        self.overflowed.cancelled().await
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflowed.is_cancelled()
    }
}

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// セッションの送信チャンネルを登録
    async fn register_client(&self, session_id: SessionId, sender: PusherChannel);

    /// セッションの送信チャンネルを登録解除（未登録の場合は何もしない）
    async fn unregister_client(&self, session_id: SessionId);

    /// 特定のセッションへ送信
    async fn push_to(&self, session_id: SessionId, content: &str) -> Result<(), MessagePushError>;

    /// 複数のセッションへ送信
    ///
    /// A failing target is logged and skipped; the rest still receive the line.
    async fn broadcast(&self, targets: &[SessionId], content: &str);
}
