//! TCP client session.

use tokio::{
    io::{AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc,
};

use super::error::ClientError;

/// Line that asks the server to end the session.
pub const QUIT_COMMAND: &str = "/quit";

/// How a client session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user sent `/quit` (or closed the input) and the server hung up
    UserQuit,
    /// The server hung up on its own
    ServerClosed,
}

fn is_quit_command(line: &str) -> bool {
    line.trim() == QUIT_COMMAND
}

/// Run one session against the server at `addr`
///
/// Server bytes are copied to `output` unchanged; lines from `input` are sent
/// newline-terminated. When `input` closes, `/quit` is sent on the user's
/// behalf. Returns once the server closes the connection.
pub async fn run_client_session<W>(
    addr: &str,
    mut input: mpsc::UnboundedReceiver<String>,
    mut output: W,
) -> Result<SessionEnd, ClientError>
where
    W: AsyncWrite + Unpin,
{
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connection {
            addr: addr.to_string(),
            source,
        })?;
    tracing::info!("Connected to chat server at {}", addr);

    let (mut reader, mut writer) = stream.into_split();
    let mut buf = [0u8; 4096];
    let mut quit_sent = false;

    loop {
        tokio::select! {
            read = reader.read(&mut buf) => {
                let n = read?;
                if n == 0 {
                    break;
                }
                output.write_all(&buf[..n]).await?;
                output.flush().await?;
            }
            line = input.recv(), if !quit_sent => {
                let line = line.unwrap_or_else(|| QUIT_COMMAND.to_string());
                writer.write_all(format!("{}\n", line).as_bytes()).await?;
                if is_quit_command(&line) {
                    quit_sent = true;
                }
            }
        }
    }

    tracing::info!("Server closed the connection");
    Ok(if quit_sent {
        SessionEnd::UserQuit
    } else {
        SessionEnd::ServerClosed
    })
}
