//! UseCase layer
//!
//! セッションからの操作（接続・ルーム参加/退出・名前変更・一覧・送信・切断）と、
//! ブロードキャストワーカーを 1 ファイル 1 ユースケースで実装します。

pub mod broadcast;
pub mod connect_session;
pub mod disconnect_session;
pub mod error;
pub mod gate;
pub mod join_room;
pub mod leave_room;
pub mod list_rooms;
pub mod list_users;
pub mod notice;
pub mod rename;
pub mod send_message;

pub use broadcast::BroadcastRouter;
pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{ConnectError, JoinRoomError, RenameError, SendMessageError};
pub use gate::DeliveryGate;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use list_rooms::ListRoomsUseCase;
pub use list_users::ListUsersUseCase;
pub use notice::NoticeFormatter;
pub use rename::RenameUseCase;
pub use send_message::SendMessageUseCase;

#[cfg(test)]
pub(crate) mod test_support;
