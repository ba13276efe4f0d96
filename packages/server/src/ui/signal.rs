//! Shutdown signal handling.

use std::io::BufRead;

use tokio::{signal, sync::oneshot};

/// Operator command typed on the server console that stops the server.
pub const CONSOLE_EXIT_COMMAND: &str = "exit";

/// Resolves on Ctrl+C, SIGTERM, or `exit` typed on the server's stdin.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
        _ = console_exit() => {
            tracing::info!("Received '{}' on the console, shutting down gracefully...", CONSOLE_EXIT_COMMAND);
        },
    }
}

/// Resolves once `exit` is read from stdin; pends forever if stdin closes.
///
/// Stdin is read on a plain thread so a pending read never holds up runtime
/// shutdown.
async fn console_exit() {
    let (tx, rx) = oneshot::channel();

    let spawned = std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) if is_exit_command(&line) => {
                        let _ = tx.send(());
                        return;
                    }
                    Ok(_) => continue,
                    Err(_) => break,
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("Console input is unavailable: {}", e);
    }

    if rx.await.is_err() {
        // stdin closed without an exit command
        std::future::pending::<()>().await;
    }
}

fn is_exit_command(line: &str) -> bool {
    line.trim() == CONSOLE_EXIT_COMMAND
}
