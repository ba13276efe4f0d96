//! Server configuration.

use std::{path::PathBuf, time::Duration};

use crate::{
    domain::DEFAULT_OUTBOUND_HEADROOM, infrastructure::repository::DEFAULT_HISTORY_CAPACITY,
    usecase::broadcast::DEFAULT_QUEUE_CAPACITY,
};

pub const DEFAULT_PORT: u16 = 8989;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;
pub const DEFAULT_HISTORY_LOG: &str = "history.log";
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Runtime settings of a [`Server`](super::Server)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum number of concurrent sessions
    pub max_connections: usize,
    /// Capacity of the broadcast queue
    pub queue_capacity: usize,
    /// Number of messages retained for replay (all rooms together)
    pub history_capacity: usize,
    /// Lines a session may have queued for writing on top of a full replay.
    /// A session that falls further behind is disconnected.
    pub outbound_headroom: usize,
    /// Append-only log of broadcast lines; `None` disables it
    pub history_log: Option<PathBuf>,
    /// Room every session joins after the handshake.
    /// `None` derives it from the listen address.
    pub default_room: Option<String>,
    /// How long shutdown waits for sessions to finish their teardown
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Capacity of each session's outbound queue
    pub fn outbound_capacity(&self) -> usize {
        self.history_capacity.saturating_add(self.outbound_headroom)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            outbound_headroom: DEFAULT_OUTBOUND_HEADROOM,
            history_log: Some(PathBuf::from(DEFAULT_HISTORY_LOG)),
            default_room: None,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // テスト項目: デフォルト設定はポート 8989・同時接続 10・キュー容量 10
        // given (前提条件):
        // when (操作):
        let config = ServerConfig::default();

        // then (期待する結果):
        assert_eq!(config.bind_addr(), "0.0.0.0:8989");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.queue_capacity, 10);
        assert_eq!(config.history_log, Some(PathBuf::from("history.log")));
    }

    #[test]
    fn test_outbound_capacity_fits_full_replay() {
        // テスト項目: 送信キューの容量は履歴の全件再生に余裕分を足した大きさになる
        // given (前提条件):
        let config = ServerConfig {
            history_capacity: 1000,
            outbound_headroom: 256,
            ..ServerConfig::default()
        };

        // when (操作):
        let capacity = config.outbound_capacity();

        // then (期待する結果):
        assert_eq!(capacity, 1256);
    }
}
