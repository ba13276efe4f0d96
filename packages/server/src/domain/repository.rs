//! Repository trait 定義
//!
//! ドメイン層が必要とする共有状態へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 各実装は自身の状態をそれぞれのロックで保護し、1 回の呼び出しの中で
//! 操作全体をアトミックに完了させなければなりません。

use async_trait::async_trait;

use super::{
    entity::{ChatMessage, JoinOutcome, LeaveOutcome},
    error::{RegistryError, RoomError},
    value_object::{DisplayName, RoomName, SessionId},
};

/// Client Registry: セッションと表示名の対応表
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// 表示名を登録し、最終的に割り当てられた表示名を返す
    ///
    /// A name already held by another session gets a random numeric suffix.
    /// Two concurrent requests for the same name never both receive it.
    async fn register(
        &self,
        session_id: SessionId,
        requested: &str,
    ) -> Result<DisplayName, RegistryError>;

    /// 表示名を変更し、(旧, 新) を返す
    ///
    /// Uniqueness is not re-checked on rename.
    async fn rename(
        &self,
        session_id: SessionId,
        new_name: DisplayName,
    ) -> Result<(DisplayName, DisplayName), RegistryError>;

    /// 登録を解除する（未登録の場合は何もしない）
    async fn unregister(&self, session_id: SessionId) -> Option<DisplayName>;

    /// セッションの現在の表示名を取得
    async fn name_of(&self, session_id: SessionId) -> Option<DisplayName>;

    /// 登録済みの全ての表示名（名前順）
    async fn list_names(&self) -> Vec<DisplayName>;
}

/// Room Directory: ルーム名とメンバーの対応表
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームに参加する
    ///
    /// A session already in a room is removed from it first, inside the same
    /// critical section, so it is never observed in two rooms. The room is
    /// created if absent.
    async fn join(&self, session_id: SessionId, room: RoomName) -> JoinOutcome;

    /// 現在のルームから退出する（どのルームにも属していなければ `None`）
    ///
    /// A room whose last member leaves is deleted.
    async fn leave(&self, session_id: SessionId) -> Option<LeaveOutcome>;

    /// セッションが現在所属しているルーム
    async fn current_room(&self, session_id: SessionId) -> Option<RoomName>;

    /// 存在する全てのルーム名（名前順）
    async fn list_rooms(&self) -> Vec<RoomName>;

    /// ルームのメンバー（参加順）
    async fn list_members(&self, room: &RoomName) -> Result<Vec<SessionId>, RoomError>;
}

/// History Store: 過去メッセージの順序付きログ
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// メッセージを末尾に追加する
    async fn append(&self, room: RoomName, message: ChatMessage);

    /// 指定ルームのメッセージを古い順に取得する
    async fn snapshot(&self, room: &RoomName) -> Vec<ChatMessage>;

    /// 保持しているメッセージ数（全ルーム合計）
    async fn len(&self) -> usize;
}
