//! HistorySink trait 定義
//!
//! ブロードキャストされた行を外部の追記専用ログへ書き出すためのインターフェース。
//! 配信の正しさには関与しません。

use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistorySink: Send + Sync {
    /// 整形済みの 1 行を追記する
    async fn append_line(&self, line: &str) -> std::io::Result<()>;
}
