//! UseCase: ユーザー一覧取得

use std::sync::Arc;

use crate::domain::{ClientRepository, DisplayName};

/// ユーザー一覧取得のユースケース
pub struct ListUsersUseCase {
    clients: Arc<dyn ClientRepository>,
}

impl ListUsersUseCase {
    pub fn new(clients: Arc<dyn ClientRepository>) -> Self {
        Self { clients }
    }

    /// 登録済みの全ての表示名（名前順）
    pub async fn execute(&self) -> Vec<DisplayName> {
        self.clients.list_names().await
    }
}
