//! 履歴ログ（追記専用の外部シンク）の実装

pub mod file;

pub use file::{FileHistorySink, NullHistorySink};
