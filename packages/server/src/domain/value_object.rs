//! 値オブジェクト
//!
//! 生成時にバリデーションを行い、不正な値が存在しないことを型で保証します。

use std::fmt;

use uuid::Uuid;

use super::error::DomainError;

/// Identity of one accepted connection.
///
/// Stands in for the remote connection in every shared structure; the socket
/// itself is owned by the session handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    /// 新しいセッション ID を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 表示名（前後の空白を除去済み、空文字列不可）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayName(String);

impl DisplayName {
    /// 表示名を作成
    ///
    /// Surrounding whitespace is trimmed; an empty result is rejected.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyDisplayName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a disambiguating suffix, e.g. `alex` + `7` → `alex7`.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ルーム名（前後の空白を除去済み、空文字列不可）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyRoomName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// メッセージ本文（末尾の改行を除去済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Minimum number of characters, after trimming, for a line to be broadcast.
    pub const MIN_CHARS: usize = 2;

    /// メッセージ本文を作成
    ///
    /// Line terminators are stripped. Lines whose trimmed form is shorter than
    /// [`Self::MIN_CHARS`] are rejected so they are never broadcast.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let content = value.trim_end_matches(['\r', '\n']);
        if content.trim().chars().count() < Self::MIN_CHARS {
            return Err(DomainError::ContentTooShort);
        }
        Ok(Self(content.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_trims_whitespace() {
        // テスト項目: 表示名の前後の空白と改行が除去される
        // given (前提条件):
        let raw = "  alice\r\n".to_string();

        // when (操作):
        let name = DisplayName::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_display_name_rejects_blank() {
        // テスト項目: 空白のみの表示名はエラーになる
        // given (前提条件):
        let raw = "   \n";

        // when (操作):
        let result = DisplayName::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(DomainError::EmptyDisplayName));
    }

    #[test]
    fn test_display_name_with_suffix() {
        // テスト項目: サフィックス付きの表示名が生成される
        // given (前提条件):
        let name = DisplayName::new("alex").unwrap();

        // when (操作):
        let suffixed = name.with_suffix("4");

        // then (期待する結果):
        assert_eq!(suffixed.as_str(), "alex4");
    }

    #[test]
    fn test_room_name_rejects_blank() {
        // テスト項目: 空のルーム名はエラーになる
        // given (前提条件):
        let raw = "\t ".to_string();

        // when (操作):
        let result = RoomName::try_from(raw);

        // then (期待する結果):
        assert_eq!(result, Err(DomainError::EmptyRoomName));
    }

    #[test]
    fn test_message_content_strips_line_terminator() {
        // テスト項目: メッセージ本文の末尾の改行が除去され、内部の空白は保持される
        // given (前提条件):
        let raw = " hello  world\r\n";

        // when (操作):
        let content = MessageContent::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(content.as_str(), " hello  world");
    }

    #[test]
    fn test_message_content_rejects_single_character() {
        // テスト項目: 1 文字だけの行や空白のみの行は破棄対象になる
        // given (前提条件):
        let inputs = ["a\n", " x \n", "   \n", "\n"];

        for input in inputs {
            // when (操作):
            let result = MessageContent::new(input);

            // then (期待する結果):
            assert_eq!(result, Err(DomainError::ContentTooShort), "input: {:?}", input);
        }
    }

    #[test]
    fn test_session_ids_are_unique() {
        // テスト項目: 生成されたセッション ID は毎回異なる
        // given (前提条件):
        let first = SessionId::generate();

        // when (操作):
        let second = SessionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
    }
}
