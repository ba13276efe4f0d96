//! UseCase: ブロードキャスト（ルーティングワーカー）
//!
//! ### 何をテストしているか
//! - BroadcastRouter::route() / BroadcastRouter::run()
//! - キューから取り出したメッセージを送信者のルームのメンバー（送信者を除く）へ配信し、
//!   履歴へ追加し、履歴ログへ書き出す
//!
//! ### なぜこのテストが必要か
//! - 同じルームの受信者には受理された順に届くことを保証する
//! - 履歴ログへの書き込み失敗が配信に影響しないことを保証する
//! - 停止時にキュー内のメッセージを処理し終えてから終了することを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：同一ルーム内の配信、複数メッセージの順序
//! - 異常系：履歴ログの書き込み失敗
//! - 送信者がルームを離れた・切断した後に取り出されたメッセージ
//! - 停止：キャンセル後のキューの排出

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    ChatMessage, HistoryRepository, HistorySink, MessagePusher, RoomRepository,
};

use super::gate::DeliveryGate;

/// Default capacity of the broadcast queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// ブロードキャストキューを作成する
///
/// Senders wait for free space when the queue is full.
pub fn broadcast_queue(
    capacity: usize,
) -> (mpsc::Sender<ChatMessage>, mpsc::Receiver<ChatMessage>) {
    mpsc::channel(capacity.max(1))
}

/// ブロードキャストキューの唯一の消費者
pub struct BroadcastRouter {
    rooms: Arc<dyn RoomRepository>,
    history: Arc<dyn HistoryRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    history_sink: Arc<dyn HistorySink>,
    gate: Arc<DeliveryGate>,
}

impl BroadcastRouter {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        history: Arc<dyn HistoryRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        history_sink: Arc<dyn HistorySink>,
        gate: Arc<DeliveryGate>,
    ) -> Self {
        Self {
            rooms,
            history,
            message_pusher,
            history_sink,
            gate,
        }
    }

    /// 1 件のメッセージを配信する
    ///
    /// The room is the sender's room at routing time. A sender that has left
    /// or disconnected since the line was accepted no longer has one, so the
    /// room recorded on the message is used instead. Returns the number of
    /// recipients.
    pub async fn route(&self, message: ChatMessage) -> usize {
        let line = message.to_line();

        let recipients = {
            let _gate = self.gate.enter().await;

            let room = match self.rooms.current_room(message.origin).await {
                Some(room) => room,
                None => {
                    tracing::debug!(
                        "Session {} left before routing, using '{}'",
                        message.origin,
                        message.room
                    );
                    message.room.clone()
                }
            };
            let targets: Vec<_> = self
                .rooms
                .list_members(&room)
                .await
                .unwrap_or_default()
                .into_iter()
                .filter(|member| *member != message.origin)
                .collect();

            self.history.append(room.clone(), message).await;
            self.message_pusher.broadcast(&targets, &line).await;
            tracing::debug!("Routed message to {} members of '{}'", targets.len(), room);
            targets.len()
        };

        if let Err(e) = self.history_sink.append_line(&line).await {
            tracing::warn!("Failed to append to history log: {}", e);
        }

        recipients
    }

    /// キューが閉じられ空になるまでメッセージを配信し続ける
    ///
    /// Cancelling `shutdown` closes the queue to new messages; what is already
    /// queued is still delivered before this returns.
    pub async fn run(
        self: Arc<Self>,
        mut queue: mpsc::Receiver<ChatMessage>,
        shutdown: CancellationToken,
    ) {
        tracing::info!("Broadcast router started");
        let mut closing = false;
        let mut routed = 0usize;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled(), if !closing => {
                    closing = true;
                    queue.close();
                    tracing::debug!("Broadcast queue closed, draining {} pending messages", queue.len());
                }
                received = queue.recv() => {
                    match received {
                        Some(message) => {
                            self.route(message).await;
                            routed += 1;
                        }
                        None => break,
                    }
                }
            }
        }

        tracing::info!("Broadcast router stopped ({} messages routed)", routed);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        domain::{MessageContent, MockHistorySink, Timestamp},
        infrastructure::history_sink::NullHistorySink,
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

    fn create_router(fixture: &Fixture, sink: Arc<dyn HistorySink>) -> Arc<BroadcastRouter> {
        Arc::new(BroadcastRouter::new(
            fixture.rooms.clone(),
            fixture.history.clone(),
            fixture.pusher.clone(),
            sink,
            fixture.gate.clone(),
        ))
    }

    #[tokio::test]
    async fn test_route_delivers_to_room_members_except_sender() {
        // テスト項目: 同じルームのメンバーには届き、送信者本人と他ルームには届かない
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let mut alice = fixture.connect("alice").await;
        let mut bob = fixture.connect("bob").await;
        let mut carol = fixture.connect("carol").await;
        join.execute(alice.id, room("lobby")).await.unwrap();
        join.execute(bob.id, room("lobby")).await.unwrap();
        join.execute(carol.id, room("other")).await.unwrap();
        alice.drain();
        bob.drain();
        carol.drain();
        let router = create_router(&fixture, Arc::new(NullHistorySink));
        let message = chat(&alice, "hello");
        let expected = message.to_line();

        // when (操作):
        let recipients = router.route(message).await;

        // then (期待する結果):
        assert_eq!(recipients, 1);
        assert_eq!(bob.drain(), vec![expected]);
        assert!(alice.drain().is_empty());
        assert!(carol.drain().is_empty());
        assert_eq!(fixture.history.snapshot(&room("lobby")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_route_uses_recorded_room_when_sender_left() {
        // テスト項目: 送信者が退室した後に取り出されたメッセージも、受理時のルームへ配信され履歴に残る
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let alice = fixture.connect("alice").await;
        let mut bob = fixture.connect("bob").await;
        join.execute(alice.id, room("lobby")).await.unwrap();
        join.execute(bob.id, room("lobby")).await.unwrap();
        let message = chat(&alice, "hello");
        let expected = message.to_line();
        fixture.leave_room().execute(alice.id).await.unwrap();
        bob.drain();
        let router = create_router(&fixture, Arc::new(NullHistorySink));

        // when (操作):
        let recipients = router.route(message).await;

        // then (期待する結果):
        assert_eq!(recipients, 1);
        assert_eq!(bob.drain(), vec![expected]);
        assert_eq!(fixture.history.snapshot(&room("lobby")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_route_to_deleted_room_still_writes_log() {
        // テスト項目: 受理時のルームが既に無くなっていても履歴ログには書き出される
        // given (前提条件):
        let fixture = Fixture::new();
        let alice = fixture.connect("alice").await;
        let message = chat(&alice, "hello");
        let expected = message.to_line();
        let mut sink = MockHistorySink::new();
        sink.expect_append_line()
            .withf(move |line| line.to_string() == expected)
            .times(1)
            .returning(|_| Ok(()));
        let router = create_router(&fixture, Arc::new(sink));

        // when (操作):
        let recipients = router.route(message).await;

        // then (期待する結果):
        assert_eq!(recipients, 0);
        assert_eq!(fixture.history.snapshot(&room("lobby")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_run_drains_messages_of_disconnected_sender() {
        // テスト項目: 送信者が切断した後でも、キューに残ったメッセージは停止時に配信・記録される
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let alice = fixture.connect("alice").await;
        let mut bob = fixture.connect("bob").await;
        join.execute(alice.id, room("lobby")).await.unwrap();
        join.execute(bob.id, room("lobby")).await.unwrap();
        let (tx, rx) = broadcast_queue(DEFAULT_QUEUE_CAPACITY);
        let message = chat(&alice, "hello");
        let expected = message.to_line();
        tx.send(message).await.unwrap();
        fixture.disconnect().execute(alice.id).await;
        bob.drain();
        let mut sink = MockHistorySink::new();
        let logged = expected.clone();
        sink.expect_append_line()
            .withf(move |line| line.to_string() == logged)
            .times(1)
            .returning(|_| Ok(()));
        let router = create_router(&fixture, Arc::new(sink));
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        // when (操作):
        tokio::time::timeout(Duration::from_secs(1), router.run(rx, shutdown))
            .await
            .expect("router should stop after draining");

        // then (期待する結果):
        assert_eq!(bob.drain(), vec![expected]);
    }

    #[tokio::test]
    async fn test_route_writes_line_to_history_sink() {
        // テスト項目: 配信した行が整形済みの形で履歴ログへ 1 回書き出される
        // given (前提条件):
        let fixture = Fixture::new();
        let alice = fixture.connect("alice").await;
        fixture.join_room().execute(alice.id, room("lobby")).await.unwrap();
        let message = chat(&alice, "hello");
        let expected = message.to_line();
        let mut sink = MockHistorySink::new();
        sink.expect_append_line()
            .withf(move |line| line.to_string() == expected)
            .times(1)
            .returning(|_| Ok(()));
        let router = create_router(&fixture, Arc::new(sink));

        // when (操作):
        let recipients = router.route(message).await;

        // then (期待する結果):
        assert_eq!(recipients, 0);
    }

    #[tokio::test]
    async fn test_route_ignores_history_sink_failure() {
        // テスト項目: 履歴ログへの書き込みが失敗しても配信と履歴は影響を受けない
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let alice = fixture.connect("alice").await;
        let mut bob = fixture.connect("bob").await;
        join.execute(alice.id, room("lobby")).await.unwrap();
        join.execute(bob.id, room("lobby")).await.unwrap();
        bob.drain();
        let mut sink = MockHistorySink::new();
        sink.expect_append_line()
            .returning(|_| Err(std::io::Error::other("disk full")));
        let router = create_router(&fixture, Arc::new(sink));
        let message = chat(&alice, "hello");
        let expected = message.to_line();

        // when (操作):
        let recipients = router.route(message).await;

        // then (期待する結果):
        assert_eq!(recipients, 1);
        assert_eq!(bob.drain(), vec![expected]);
        assert_eq!(fixture.history.len().await, 1);
    }

    #[tokio::test]
    async fn test_run_preserves_order_and_drains_on_shutdown() {
        // テスト項目: 受理順に配信され、停止後もキューに残ったメッセージは配信される
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let alice = fixture.connect("alice").await;
        let mut bob = fixture.connect("bob").await;
        join.execute(alice.id, room("lobby")).await.unwrap();
        join.execute(bob.id, room("lobby")).await.unwrap();
        bob.drain();
        let router = create_router(&fixture, Arc::new(NullHistorySink));
        let (tx, rx) = broadcast_queue(DEFAULT_QUEUE_CAPACITY);
        let messages: Vec<_> = ["M1", "M2", "M3"].iter().map(|t| chat(&alice, t)).collect();
        for message in &messages {
            tx.send(message.clone()).await.unwrap();
        }
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        // when (操作):
        tokio::time::timeout(Duration::from_secs(1), router.run(rx, shutdown))
            .await
            .expect("router should stop after draining");

        // then (期待する結果):
        let expected: Vec<_> = messages.iter().map(|m| m.to_line()).collect();
        assert_eq!(bob.drain(), expected);
        assert!(tx.send(chat(&alice, "late")).await.is_err());
    }

    #[tokio::test]
    async fn test_join_after_routing_replays_without_duplicates() {
        // テスト項目: M1〜M3 の配信後に参加したセッションは履歴で 1 回ずつ受け取り、
        //             その後の M4 はライブで 1 回だけ受け取る
        // given (前提条件):
        let fixture = Fixture::new();
        let join = fixture.join_room();
        let alice = fixture.connect("alice").await;
        let mut bob = fixture.connect("bob").await;
        join.execute(alice.id, room("lobby")).await.unwrap();
        let router = create_router(&fixture, Arc::new(NullHistorySink));
        let early: Vec<_> = ["M1", "M2", "M3"].iter().map(|t| chat(&alice, t)).collect();
        for message in &early {
            router.route(message.clone()).await;
        }

        // when (操作):
        join.execute(bob.id, room("lobby")).await.unwrap();
        let m4 = chat(&alice, "M4");
        router.route(m4.clone()).await;

        // then (期待する結果):
        let mut expected = vec!["You have joined: lobby\n".to_string()];
        expected.extend(early.iter().map(|m| m.to_line()));
        expected.push(m4.to_line());
        assert_eq!(bob.drain(), expected);
    }
}
