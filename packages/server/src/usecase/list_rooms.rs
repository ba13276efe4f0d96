//! UseCase: ルーム一覧・メンバー一覧取得

use std::sync::Arc;

use crate::domain::{ClientRepository, DisplayName, RoomError, RoomName, RoomRepository};

/// ルーム一覧・メンバー一覧取得のユースケース
pub struct ListRoomsUseCase {
    rooms: Arc<dyn RoomRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl ListRoomsUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, clients: Arc<dyn ClientRepository>) -> Self {
        Self { rooms, clients }
    }

    /// 存在する全てのルーム名（名前順）
    pub async fn rooms(&self) -> Vec<RoomName> {
        self.rooms.list_rooms().await
    }

    /// ルームのメンバーの現在の表示名（参加順）
    ///
    /// Members that have already unregistered are skipped.
    pub async fn members(&self, room: &RoomName) -> Result<Vec<DisplayName>, RoomError> {
        let member_ids = self.rooms.list_members(room).await?;

        let mut names = Vec::with_capacity(member_ids.len());
        for member in member_ids {
            if let Some(name) = self.clients.name_of(member).await {
                names.push(name);
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{Fixture, room};

    #[tokio::test]
    async fn test_members_show_current_names_in_join_order() {
        // テスト項目: メンバー一覧は参加順で、名前変更後の表示名が使われる
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let bob = fixture.connect("bob").await;
        let alice = fixture.connect("alice").await;
        join.execute(bob.id, room("lobby")).await.unwrap();
        join.execute(alice.id, room("lobby")).await.unwrap();
        fixture.rename().execute(bob.id, Some("robert")).await.unwrap();
        let usecase = ListRoomsUseCase::new(fixture.rooms.clone(), fixture.clients.clone());

        // when (操作):
        let members: Vec<String> = usecase
            .members(&room("lobby"))
            .await
            .unwrap()
            .into_iter()
            .map(DisplayName::into_string)
            .collect();

        // then (期待する結果):
        assert_eq!(members, vec!["robert", "alice"]);
    }

    #[tokio::test]
    async fn test_members_of_unknown_room() {
        // テスト項目: 存在しないルームのメンバー一覧は RoomNotFound エラー
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = ListRoomsUseCase::new(fixture.rooms.clone(), fixture.clients.clone());

        // when (操作):
        let result = usecase.members(&room("ghost")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomError::RoomNotFound("ghost".to_string())));
    }

    #[tokio::test]
    async fn test_rooms_listed_by_name() {
        // テスト項目: ルーム一覧は名前順で返され、空になったルームは含まれない
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let alice = fixture.connect("alice").await;
        let bob = fixture.connect("bob").await;
        join.execute(alice.id, room("beta")).await.unwrap();
        join.execute(bob.id, room("alpha")).await.unwrap();
        join.execute(bob.id, room("gamma")).await.unwrap();
        let usecase = ListRoomsUseCase::new(fixture.rooms.clone(), fixture.clients.clone());

        // when (操作):
        let rooms = usecase.rooms().await;

        // then (期待する結果):
        assert_eq!(rooms, vec![room("beta"), room("gamma")]);
    }
}
