//! Server state shared by every session.

use std::sync::Arc;

use crate::{
    domain::RoomName,
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        ListRoomsUseCase, ListUsersUseCase, RenameUseCase, SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectSessionUseCase（名前登録のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// RenameUseCase（名前変更のユースケース）
    pub rename_usecase: Arc<RenameUseCase>,
    /// ListUsersUseCase（ユーザー一覧のユースケース）
    pub list_users_usecase: Arc<ListUsersUseCase>,
    /// ListRoomsUseCase（ルーム一覧・メンバー一覧のユースケース）
    pub list_rooms_usecase: Arc<ListRoomsUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// Room every session joins after the handshake
    pub default_room: RoomName,
    /// Capacity of each session's outbound queue
    pub outbound_capacity: usize,
}
