//! Line-oriented TCP chat client.
//!
//! Connects to a tcpchat server, prints everything it sends, and forwards
//! each typed line. `/quit` or Ctrl+D ends the session.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tcpchat-client
//! cargo run --bin tcpchat-client -- 9000 --host 192.168.0.10
//! ```

use clap::Parser;
use tcpchat_client::{SessionEnd, input::spawn_line_reader, run_client_session};
use tcpchat_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tcpchat-client")]
#[command(about = "Line-oriented client for the TCP chat server", long_about = None)]
struct Args {
    /// Server port
    #[arg(default_value_t = 8989)]
    port: u16,

    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let input = spawn_line_reader("");
    match run_client_session(&addr, input, tokio::io::stdout()).await {
        Ok(SessionEnd::UserQuit) => {}
        Ok(SessionEnd::ServerClosed) => println!("\nDisconnected by the server."),
        Err(e) => {
            tracing::error!("Client error: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
