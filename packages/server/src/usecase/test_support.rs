//! Shared fixtures for use case tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{ClientRepository, DisplayName, MessagePusher, PusherChannel, RoomName, SessionId},
    infrastructure::{
        message_pusher::TcpMessagePusher,
        repository::{InMemoryClientRepository, InMemoryHistoryRepository, InMemoryRoomRepository},
    },
};

use super::{
    DeliveryGate, DisconnectSessionUseCase, JoinRoomUseCase, LeaveRoomUseCase, RenameUseCase,
};

pub(crate) struct Fixture {
    pub clients: Arc<InMemoryClientRepository>,
    pub rooms: Arc<InMemoryRoomRepository>,
    pub history: Arc<InMemoryHistoryRepository>,
    pub pusher: Arc<TcpMessagePusher>,
    pub gate: Arc<DeliveryGate>,
}

pub(crate) struct TestSession {
    pub id: SessionId,
    pub name: DisplayName,
    pub rx: mpsc::Receiver<String>,
}

impl TestSession {
    /// Lines pushed so far, without waiting.
    pub fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.rx.try_recv() {
            lines.push(line);
        }
        lines
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(InMemoryClientRepository::new()),
            rooms: Arc::new(InMemoryRoomRepository::new()),
            history: Arc::new(InMemoryHistoryRepository::default()),
            pusher: Arc::new(TcpMessagePusher::new()),
            gate: Arc::new(DeliveryGate::new()),
        }
    }

    /// Register a name and an outbound channel, without joining a room.
    pub async fn connect(&self, requested: &str) -> TestSession {
        let id = SessionId::generate();
        let name = self.clients.register(id, requested).await.unwrap();
        let (tx, rx) = PusherChannel::bounded(64);
        self.pusher.register_client(id, tx).await;
        TestSession { id, name, rx }
    }

    pub fn join_room(&self) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            self.rooms.clone(),
            self.clients.clone(),
            self.history.clone(),
            self.pusher.clone(),
            self.gate.clone(),
        )
    }

    pub fn leave_room(&self) -> LeaveRoomUseCase {
        LeaveRoomUseCase::new(
            self.rooms.clone(),
            self.clients.clone(),
            self.pusher.clone(),
            self.gate.clone(),
        )
    }

    pub fn rename(&self) -> RenameUseCase {
        RenameUseCase::new(
            self.clients.clone(),
            self.rooms.clone(),
            self.pusher.clone(),
            self.gate.clone(),
        )
    }

    pub fn disconnect(&self) -> DisconnectSessionUseCase {
        DisconnectSessionUseCase::new(
            self.rooms.clone(),
            self.clients.clone(),
            self.pusher.clone(),
            self.gate.clone(),
        )
    }
}

pub(crate) fn room(name: &str) -> RoomName {
    RoomName::new(name).unwrap()
}
