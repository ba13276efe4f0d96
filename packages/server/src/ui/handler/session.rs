//! TCP session handler.
//!
//! One task per admitted connection, from the name prompt to teardown.

use std::{borrow::Cow, net::SocketAddr, sync::Arc, time::Duration};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpStream, tcp::OwnedWriteHalf},
    sync::mpsc,
    task::JoinHandle,
};

use crate::{
    domain::{PusherChannel, RoomError, RoomName, SessionId},
    ui::{admission::AdmissionPermit, shutdown::ShutdownCoordinator, state::AppState},
    usecase::{JoinRoomError, NoticeFormatter, RenameError, SendMessageError},
};

use super::command::{Command, Input, parse_line};

/// How long teardown waits for queued outbound lines to be written.
const WRITER_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Why the active loop of a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Quit,
    PeerClosed,
    ReadFailed,
    WriterClosed,
    /// The outbound queue filled up because the peer is not reading
    SlowReader,
    Shutdown,
}

/// Writes the capacity notice to a connection that was not admitted, then closes it.
pub async fn reject_connection(mut stream: TcpStream, peer: SocketAddr) {
    if let Err(e) = stream
        .write_all(NoticeFormatter::capacity_exceeded().as_bytes())
        .await
    {
        tracing::debug!("Failed to send capacity notice to {}: {}", peer, e);
    }
    let _ = stream.shutdown().await;
}

/// Spawns the task that drains the session's outbound channel into the socket.
///
/// Ends when every sender of the channel is gone or a write fails; the write
/// half is shut down on the way out.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut writer: OwnedWriteHalf,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if let Err(e) = writer.write_all(line.as_bytes()).await {
                tracing::debug!("Write failed, closing writer: {}", e);
                break;
            }
        }
        let _ = writer.shutdown().await;
    })
}

fn reply(outbound: &PusherChannel, text: impl Into<String>) {
    if let Err(e) = outbound.push(text.into()) {
        tracing::debug!("Reply dropped: {}", e);
    }
}

/// Lines are relayed as received; bytes that are not UTF-8 become U+FFFD.
fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    permit: AdmissionPermit,
    state: Arc<AppState>,
    shutdown: ShutdownCoordinator,
) {
    let session_id = SessionId::generate();
    tracing::info!("Session {} accepted from {}", session_id, peer);

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    // AwaitingName
    if let Err(e) = writer
        .write_all(NoticeFormatter::greeting().as_bytes())
        .await
    {
        tracing::debug!("Failed to greet {}: {}", peer, e);
        drop(permit);
        return;
    }
    let read = tokio::select! {
        _ = shutdown.cancelled() => None,
        result = reader.read_until(b'\n', &mut buf) => match result {
            Ok(0) => None,
            Ok(_) => Some(()),
            Err(e) => {
                tracing::debug!("Failed to read name from {}: {}", peer, e);
                None
            }
        },
    };
    if read.is_none() {
        tracing::info!("Session {} closed before choosing a name", session_id);
        drop(permit);
        return;
    }

    let (outbound, rx) = PusherChannel::bounded(state.outbound_capacity);
    let name = match state
        .connect_session_usecase
        .execute(session_id, &decode_line(&buf), outbound.clone())
        .await
    {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("Rejected name from {}: {}", peer, e);
            let _ = writer
                .write_all(NoticeFormatter::invalid_name().as_bytes())
                .await;
            let _ = writer.shutdown().await;
            drop(reader);
            drop(permit);
            return;
        }
    };

    // Active
    let mut writer_task = pusher_loop(rx, writer);
    reply(&outbound, NoticeFormatter::welcome(&name));
    if let Err(e) = state
        .join_room_usecase
        .execute(session_id, state.default_room.clone())
        .await
    {
        tracing::warn!("Session {} could not join the default room: {}", session_id, e);
    }

    let mut writer_finished = false;
    let end = loop {
        buf.clear();
        let result = tokio::select! {
            _ = shutdown.cancelled() => break SessionEnd::Shutdown,
            _ = &mut writer_task, if !writer_finished => {
                writer_finished = true;
                break SessionEnd::WriterClosed;
            }
            _ = outbound.overflowed() => break SessionEnd::SlowReader,
            result = reader.read_until(b'\n', &mut buf) => result,
        };
        match result {
            Ok(0) => break SessionEnd::PeerClosed,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("Read failed for session {}: {}", session_id, e);
                break SessionEnd::ReadFailed;
            }
        }

        let line = decode_line(&buf);
        match parse_line(&line) {
            Input::Blank => {}
            Input::Content(text) => send_content(&state, &outbound, session_id, &text).await,
            Input::Command(Command::Quit) => {
                reply(&outbound, NoticeFormatter::farewell());
                break SessionEnd::Quit;
            }
            Input::Command(command) => {
                dispatch_command(&state, &outbound, session_id, command).await
            }
        }
    };

    // Closing: room departure, registry removal, connection close, permit release
    let outcome = state.disconnect_session_usecase.execute(session_id).await;
    drop(outbound);
    if end == SessionEnd::SlowReader {
        writer_task.abort();
    } else if !writer_finished
        && tokio::time::timeout(WRITER_FLUSH_TIMEOUT, &mut writer_task)
            .await
            .is_err()
    {
        tracing::debug!("Writer of session {} did not flush in time", session_id);
        writer_task.abort();
    }
    drop(reader);
    drop(permit);

    tracing::info!(
        "Session {} ('{}') closed: {:?}{}",
        session_id,
        outcome
            .name
            .as_ref()
            .map(|name| name.as_str())
            .unwrap_or(name.as_str()),
        end,
        outcome
            .left_room
            .map(|room| format!(", left room '{}'", room))
            .unwrap_or_default()
    );
}

async fn send_content(
    state: &AppState,
    outbound: &PusherChannel,
    session_id: SessionId,
    text: &str,
) {
    match state.send_message_usecase.execute(session_id, text).await {
        Ok(()) => {}
        Err(SendMessageError::ContentTooShort) => {
            tracing::debug!("Discarded short line from session {}", session_id);
        }
        Err(SendMessageError::NotInRoom) => reply(outbound, NoticeFormatter::not_in_room()),
        Err(e) => tracing::debug!("Message from session {} not sent: {}", session_id, e),
    }
}

async fn dispatch_command(
    state: &AppState,
    outbound: &PusherChannel,
    session_id: SessionId,
    command: Command,
) {
    tracing::debug!("Session {} issued {:?}", session_id, command);

    match command {
        Command::Name(new_name) => {
            match state
                .rename_usecase
                .execute(session_id, new_name.as_deref())
                .await
            {
                Ok(_) => {}
                Err(RenameError::MissingName) => reply(outbound, NoticeFormatter::name_usage()),
                Err(e) => tracing::warn!("Rename failed for session {}: {}", session_id, e),
            }
        }
        Command::Users => {
            let names = state.list_users_usecase.execute().await;
            reply(outbound, NoticeFormatter::user_list(&names));
        }
        Command::Help => reply(outbound, NoticeFormatter::help()),
        Command::Join(None) => reply(outbound, NoticeFormatter::join_usage()),
        Command::Join(Some(room)) => {
            let Ok(room) = RoomName::new(room) else {
                reply(outbound, NoticeFormatter::join_usage());
                return;
            };
            match state.join_room_usecase.execute(session_id, room).await {
                Ok(_) => {}
                Err(JoinRoomError::AlreadyInRoom(room)) => {
                    reply(outbound, NoticeFormatter::already_in_room(&room))
                }
                Err(JoinRoomError::InvalidRoomName(_)) => {
                    reply(outbound, NoticeFormatter::join_usage())
                }
            }
        }
        Command::Leave => {
            if let Err(e) = state.leave_room_usecase.execute(session_id).await {
                tracing::debug!("Leave failed for session {}: {}", session_id, e);
                reply(outbound, NoticeFormatter::not_in_room());
            }
        }
        Command::Rooms(None) => {
            let rooms = state.list_rooms_usecase.rooms().await;
            reply(outbound, NoticeFormatter::room_list(&rooms));
        }
        Command::Rooms(Some(raw)) => {
            let members = match RoomName::new(raw.as_str()) {
                Ok(room) => state
                    .list_rooms_usecase
                    .members(&room)
                    .await
                    .map(|members| NoticeFormatter::member_list(&room, &members)),
                Err(_) => Err(RoomError::RoomNotFound(raw.clone())),
            };
            match members {
                Ok(text) => reply(outbound, text),
                Err(_) => reply(outbound, NoticeFormatter::room_not_found(&raw)),
            }
        }
        Command::Quit => {}
    }
}
