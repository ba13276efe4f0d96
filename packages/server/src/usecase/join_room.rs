//! UseCase: ルーム参加処理
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute()
//! - 現在のルームからの退出 → 新しいルームへの参加 → 履歴の再生 → 既存メンバーへの通知
//!
//! ### なぜこのテストが必要か
//! - セッションが同時に 2 つのルームに属さないことを保証する
//! - 参加前のメッセージは履歴として、参加後のメッセージはライブで、
//!   それぞれ 1 回だけ届くことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：初回参加、別ルームへの移動
//! - エッジケース：既に参加しているルームへの再参加

use std::sync::Arc;

use crate::domain::{
    ClientRepository, HistoryRepository, JoinOutcome, MessagePusher, RoomName, RoomRepository,
    SessionId,
};

use super::{
    error::JoinRoomError, gate::DeliveryGate, leave_room::announce_departure,
    notice::NoticeFormatter,
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    rooms: Arc<dyn RoomRepository>,
    clients: Arc<dyn ClientRepository>,
    history: Arc<dyn HistoryRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    gate: Arc<DeliveryGate>,
}

impl JoinRoomUseCase {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        clients: Arc<dyn ClientRepository>,
        history: Arc<dyn HistoryRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        gate: Arc<DeliveryGate>,
    ) -> Self {
        Self {
            rooms,
            clients,
            history,
            message_pusher,
            gate,
        }
    }

    /// ルームに参加する
    ///
    /// The joiner receives, in order: the leave confirmation for its previous
    /// room (if any), the join confirmation, then the room's history. Existing
    /// members of the new room are told about the arrival.
    pub async fn execute(
        &self,
        session_id: SessionId,
        room: RoomName,
    ) -> Result<JoinOutcome, JoinRoomError> {
        let _gate = self.gate.enter().await;

        if self.rooms.current_room(session_id).await.as_ref() == Some(&room) {
            return Err(JoinRoomError::AlreadyInRoom(room.as_str().to_string()));
        }

        let name = self.clients.name_of(session_id).await;
        let outcome = self.rooms.join(session_id, room.clone()).await;

        if let Some(left) = &outcome.left {
            announce_departure(
                self.message_pusher.as_ref(),
                session_id,
                name.as_ref(),
                left,
                true,
            )
            .await;
        }

        let mut replay = vec![NoticeFormatter::you_joined(&room)];
        replay.extend(
            self.history
                .snapshot(&room)
                .await
                .iter()
                .map(|message| message.to_line()),
        );
        for line in &replay {
            if let Err(e) = self.message_pusher.push_to(session_id, line).await {
                tracing::debug!("Stopped replay to session {}: {}", session_id, e);
                break;
            }
        }

        if let Some(name) = &name {
            self.message_pusher
                .broadcast(&outcome.existing_members, &NoticeFormatter::member_joined(name))
                .await;
        }
        tracing::info!(
            "Session {} joined room '{}' ({} history lines replayed)",
            session_id,
            room,
            replay.len() - 1
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChatMessage, MessageContent, Timestamp},
        usecase::test_support::{Fixture, TestSession, room},
    };

    fn chat(sender: &TestSession, text: &str) -> ChatMessage {
        ChatMessage::new(
            sender.name.clone(),
            MessageContent::new(text).unwrap(),
            sender.id,
            room("lobby"),
            Timestamp::new(1_700_000_000_000),
        )
    }

    #[tokio::test]
    async fn test_join_confirms_and_notifies_existing_members() {
        // テスト項目: 参加すると本人に確認が届き、既存メンバーに参加通知が届く
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let mut alice = fixture.connect("alice").await;
        let mut bob = fixture.connect("bob").await;
        join.execute(alice.id, room("lobby")).await.unwrap();
        alice.drain();

        // when (操作):
        let outcome = join.execute(bob.id, room("lobby")).await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome.existing_members, vec![alice.id]);
        assert_eq!(bob.drain(), vec!["You have joined: lobby\n"]);
        assert_eq!(alice.drain(), vec!["bob has joined the room!\n"]);
    }

    #[tokio::test]
    async fn test_join_other_room_moves_session() {
        // テスト項目: /join roomB の後は roomA のメンバーではなく roomB のメンバーになる
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let mut alice = fixture.connect("alice").await;
        let mut bob = fixture.connect("bob").await;
        join.execute(alice.id, room("roomA")).await.unwrap();
        join.execute(bob.id, room("roomA")).await.unwrap();
        alice.drain();
        bob.drain();

        // when (操作):
        join.execute(alice.id, room("roomB")).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            fixture.rooms.list_members(&room("roomA")).await.unwrap(),
            vec![bob.id]
        );
        assert_eq!(
            fixture.rooms.list_members(&room("roomB")).await.unwrap(),
            vec![alice.id]
        );
        assert_eq!(
            alice.drain(),
            vec!["You have left the room: roomA\n", "You have joined: roomB\n"]
        );
        assert_eq!(bob.drain(), vec!["alice has left the room!\n"]);
    }

    #[tokio::test]
    async fn test_join_replays_room_history_in_order() {
        // テスト項目: 参加時にそのルームの履歴が古い順に再生され、他ルームの履歴は含まれない
        // given (前提条件):
        let fixture = Fixture::new();
        let alice = fixture.connect("alice").await;
        let mut bob = fixture.connect("bob").await;
        let m1 = chat(&alice, "M1");
        let m2 = chat(&alice, "M2");
        let m3 = chat(&alice, "M3");
        fixture.history.append(room("lobby"), m1.clone()).await;
        fixture.history.append(room("other"), chat(&alice, "X1")).await;
        fixture.history.append(room("lobby"), m2.clone()).await;
        fixture.history.append(room("lobby"), m3.clone()).await;

        // when (操作):
        fixture
            .join_room()
            .execute(bob.id, room("lobby"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            bob.drain(),
            vec![
                "You have joined: lobby\n".to_string(),
                m1.to_line(),
                m2.to_line(),
                m3.to_line(),
            ]
        );
    }

    #[tokio::test]
    async fn test_join_current_room_is_rejected() {
        // テスト項目: 既に参加しているルームへの参加は AlreadyInRoom エラー
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let mut alice = fixture.connect("alice").await;
        join.execute(alice.id, room("lobby")).await.unwrap();
        alice.drain();

        // when (操作):
        let result = join.execute(alice.id, room("lobby")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinRoomError::AlreadyInRoom("lobby".to_string()))
        );
        assert!(alice.drain().is_empty());
        assert_eq!(
            fixture.rooms.list_members(&room("lobby")).await.unwrap(),
            vec![alice.id]
        );
    }
}
