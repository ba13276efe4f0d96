//! ファイルへ追記する HistorySink 実装

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

use crate::domain::HistorySink;

/// Appends each broadcast line to a log file.
///
/// A line identical to the one written immediately before it is skipped.
pub struct FileHistorySink {
    path: PathBuf,
    last_line: Mutex<Option<String>>,
}

impl FileHistorySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_line: Mutex::new(None),
        }
    }
}

#[async_trait]
impl HistorySink for FileHistorySink {
    async fn append_line(&self, line: &str) -> std::io::Result<()> {
        let mut last_line = self.last_line.lock().await;
        if last_line.as_deref() == Some(line) {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            file.write_all(b"\n").await?;
        }
        file.flush().await?;

        *last_line = Some(line.to_string());
        Ok(())
    }
}

/// Discards every line (history logging disabled).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHistorySink;

#[async_trait]
impl HistorySink for NullHistorySink {
    async fn append_line(&self, _line: &str) -> std::io::Result<()> {
        Ok(())
    }
}
