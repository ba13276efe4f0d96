//! Multi-room TCP chat server.
//!
//! Clients connect with any line-based TCP tool (e.g. `nc`) or `tcpchat-client`,
//! choose a name, and chat with the other members of their room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tcpchat-server
//! cargo run --bin tcpchat-server -- 9000 --max-connections 20
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tcpchat_server::{
    domain::DEFAULT_OUTBOUND_HEADROOM,
    infrastructure::repository::DEFAULT_HISTORY_CAPACITY,
    ui::{
        Server, ServerConfig, ShutdownCoordinator,
        config::{DEFAULT_HISTORY_LOG, DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT},
        shutdown_signal,
    },
    usecase::broadcast::DEFAULT_QUEUE_CAPACITY,
};
use tcpchat_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tcpchat-server")]
#[command(about = "Multi-room TCP chat server", long_about = None)]
struct Args {
    /// Port number to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Maximum number of concurrent sessions
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,

    /// Capacity of the broadcast queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Number of messages kept for replay
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,

    /// Lines a session may fall behind, beyond a full replay, before it is disconnected
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_HEADROOM)]
    outbound_headroom: usize,

    /// File every broadcast line is appended to
    #[arg(long, default_value = DEFAULT_HISTORY_LOG)]
    history_log: PathBuf,

    /// Do not write the history log
    #[arg(long)]
    no_history_log: bool,

    /// Room sessions join after choosing a name (defaults to one named after the listen address)
    #[arg(long)]
    default_room: Option<String>,

    /// Seconds to wait for sessions to close on shutdown
    #[arg(long, default_value_t = 5)]
    shutdown_grace_secs: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_connections: args.max_connections,
            queue_capacity: args.queue_capacity,
            history_capacity: args.history_capacity,
            outbound_headroom: args.outbound_headroom,
            history_log: (!args.no_history_log).then_some(args.history_log),
            default_room: args.default_room,
            shutdown_grace: Duration::from_secs(args.shutdown_grace_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());
    let shutdown = ShutdownCoordinator::new(config.shutdown_grace);

    // Set up graceful shutdown signal handler
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });
    tracing::info!("Type 'exit' or press Ctrl+C to shutdown gracefully");

    let server = Server::new(config);
    if let Err(e) = server.run(shutdown).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
