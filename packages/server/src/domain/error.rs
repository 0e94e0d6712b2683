//! Domain layer のエラー定義

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username must be at most {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("peer id must not be empty")]
    EmptyPeerId,
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// 表示名が既に接続中のクライアントに使われている
    #[error("username '{0}' is already taken")]
    NameTaken(String),

    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("room '{0}' not found")]
    RoomNotFound(String),
}

/// メッセージ送信（通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("failed to encode message: {0}")]
    Encode(String),

    /// 送信先の接続が既に閉じている
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
