//! Server execution logic.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use tcpchat_shared::time::SystemClock;
use thiserror::Error;
use tokio::{net::TcpListener, sync::mpsc};

use crate::{
    domain::{ChatMessage, DomainError, HistorySink, RoomName},
    infrastructure::{
        history_sink::{FileHistorySink, NullHistorySink},
        message_pusher::TcpMessagePusher,
        repository::{InMemoryClientRepository, InMemoryHistoryRepository, InMemoryRoomRepository},
    },
    usecase::{
        BroadcastRouter, ConnectSessionUseCase, DeliveryGate, DisconnectSessionUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, ListRoomsUseCase, ListUsersUseCase, RenameUseCase,
        SendMessageUseCase, broadcast::broadcast_queue,
    },
};

use super::{
    admission::AdmissionController,
    config::ServerConfig,
    handler::{handle_connection, reject_connection},
    shutdown::ShutdownCoordinator,
    state::AppState,
};

/// Pause after a failed `accept` before trying again.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read the listen address: {0}")]
    LocalAddr(#[source] io::Error),

    #[error("invalid default room name: {0}")]
    InvalidDefaultRoom(#[from] DomainError),
}

/// TCP chat server
///
/// Wires the in-memory repositories, the use cases and the broadcast router
/// together, then serves connections until shutdown.
///
/// # Example
///
/// ```ignore
/// let shutdown = ShutdownCoordinator::new(config.shutdown_grace);
/// let server = Server::new(config);
/// server.run(shutdown).await?;
/// ```
pub struct Server {
    config: ServerConfig,
    admission: AdmissionController,
    connect_session_usecase: Arc<ConnectSessionUseCase>,
    disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    join_room_usecase: Arc<JoinRoomUseCase>,
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    rename_usecase: Arc<RenameUseCase>,
    list_users_usecase: Arc<ListUsersUseCase>,
    list_rooms_usecase: Arc<ListRoomsUseCase>,
    send_message_usecase: Arc<SendMessageUseCase>,
    router: Arc<BroadcastRouter>,
    queue: mpsc::Receiver<ChatMessage>,
}

impl Server {
    /// Create a server whose history log is the file named in `config`
    pub fn new(config: ServerConfig) -> Self {
        let history_sink: Arc<dyn HistorySink> = match &config.history_log {
            Some(path) => Arc::new(FileHistorySink::new(path.clone())),
            None => Arc::new(NullHistorySink),
        };
        Self::with_history_sink(config, history_sink)
    }

    pub fn with_history_sink(config: ServerConfig, history_sink: Arc<dyn HistorySink>) -> Self {
        // Initialize dependencies in order:
        // 1. Repository
        // 2. MessagePusher
        // 3. UseCases and the broadcast router

        // 1. Create Repository (in-memory shared state)
        let clients = Arc::new(InMemoryClientRepository::new());
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let history = Arc::new(InMemoryHistoryRepository::with_capacity(
            config.history_capacity,
        ));

        // 2. Create MessagePusher (per-session outbound channels)
        let message_pusher = Arc::new(TcpMessagePusher::new());

        // 3. Create UseCases
        let gate = Arc::new(DeliveryGate::new());
        let (queue_tx, queue_rx) = broadcast_queue(config.queue_capacity);

        let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
            clients.clone(),
            message_pusher.clone(),
        ));
        let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
            rooms.clone(),
            clients.clone(),
            message_pusher.clone(),
            gate.clone(),
        ));
        let join_room_usecase = Arc::new(JoinRoomUseCase::new(
            rooms.clone(),
            clients.clone(),
            history.clone(),
            message_pusher.clone(),
            gate.clone(),
        ));
        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
            rooms.clone(),
            clients.clone(),
            message_pusher.clone(),
            gate.clone(),
        ));
        let rename_usecase = Arc::new(RenameUseCase::new(
            clients.clone(),
            rooms.clone(),
            message_pusher.clone(),
            gate.clone(),
        ));
        let list_users_usecase = Arc::new(ListUsersUseCase::new(clients.clone()));
        let list_rooms_usecase = Arc::new(ListRoomsUseCase::new(rooms.clone(), clients.clone()));
        let send_message_usecase = Arc::new(SendMessageUseCase::new(
            clients,
            rooms.clone(),
            queue_tx,
            Arc::new(SystemClock),
        ));
        let router = Arc::new(BroadcastRouter::new(
            rooms,
            history,
            message_pusher,
            history_sink,
            gate,
        ));

        Self {
            admission: AdmissionController::new(config.max_connections),
            config,
            connect_session_usecase,
            disconnect_session_usecase,
            join_room_usecase,
            leave_room_usecase,
            rename_usecase,
            list_users_usecase,
            list_rooms_usecase,
            send_message_usecase,
            router,
            queue: queue_rx,
        }
    }

    /// Bind to the configured address and serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address.
    pub async fn run(self, shutdown: ShutdownCoordinator) -> Result<(), ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener, shutdown).await
    }

    /// Serve connections from an already bound listener until shutdown
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownCoordinator,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;
        let default_room = default_room_name(self.config.default_room.as_deref(), local_addr)?;

        let router_task = tokio::spawn(self.router.clone().run(self.queue, shutdown.token()));
        let state = Arc::new(AppState {
            connect_session_usecase: self.connect_session_usecase,
            disconnect_session_usecase: self.disconnect_session_usecase,
            join_room_usecase: self.join_room_usecase,
            leave_room_usecase: self.leave_room_usecase,
            rename_usecase: self.rename_usecase,
            list_users_usecase: self.list_users_usecase,
            list_rooms_usecase: self.list_rooms_usecase,
            send_message_usecase: self.send_message_usecase,
            default_room,
            outbound_capacity: self.config.outbound_capacity(),
        });
        let admission = self.admission;

        tracing::info!("TCP chat server listening on {}", local_addr);
        tracing::info!(
            "Default room '{}', at most {} sessions",
            state.default_room,
            admission.capacity()
        );

        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                        continue;
                    }
                },
            };

            match admission.try_admit() {
                Ok(permit) => {
                    tracing::debug!(
                        "Admitted {} ({} slots left)",
                        peer,
                        admission.available()
                    );
                    shutdown.spawn(handle_connection(
                        stream,
                        peer,
                        permit,
                        state.clone(),
                        shutdown.clone(),
                    ));
                }
                Err(e) => {
                    tracing::warn!("Rejected connection from {}: {}", peer, e);
                    tokio::spawn(reject_connection(stream, peer));
                }
            }
        }

        // Stop accepting, then wait for every session's teardown
        drop(listener);
        tracing::info!("Stopped accepting connections");
        shutdown.drain().await;
        if let Err(e) = router_task.await {
            tracing::error!("Broadcast router failed: {}", e);
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// The configured default room, or one keyed by the listen address.
fn default_room_name(configured: Option<&str>, local_addr: SocketAddr) -> Result<RoomName, DomainError> {
    match configured {
        Some(name) => RoomName::new(name),
        None => RoomName::new(format!("lobby_{}", local_addr)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_room_keyed_by_listen_address() {
        // テスト項目: デフォルトルーム名は待ち受けアドレスから決まり、設定があればそれを使う
        // given (前提条件):
        let addr: SocketAddr = "127.0.0.1:8989".parse().unwrap();

        // when (操作):
        let derived = default_room_name(None, addr).unwrap();
        let configured = default_room_name(Some("general"), addr).unwrap();

        // then (期待する結果):
        assert_eq!(derived.as_str(), "lobby_127.0.0.1:8989");
        assert_eq!(configured.as_str(), "general");
        assert!(default_room_name(Some("  "), addr).is_err());
    }

    #[tokio::test]
    async fn test_run_fails_when_address_in_use() {
        // テスト項目: 待ち受けアドレスが使用中の場合は Bind エラーで終了する
        // given (前提条件):
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            history_log: None,
            ..ServerConfig::default()
        };

        // when (操作):
        let result = Server::new(config)
            .run(ShutdownCoordinator::new(Duration::from_secs(1)))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
