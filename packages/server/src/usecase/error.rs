//! UseCase layer のエラー定義

use thiserror::Error;

/// 識別（IDENTIFY）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifyError {
    #[error("username '{0}' is already taken")]
    NameTaken(String),

    #[error("failed to register client: {0}")]
    Repository(String),
}

/// ルーム参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    /// 参加者本人へのメンバー表の送信に失敗した
    #[error("failed to deliver room members: {0}")]
    NotifyFailed(String),
}

/// シグナリングメッセージ中継のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// 宛先が接続していない（切断済み、または ID の誤り）
    #[error("target peer '{0}' not found")]
    TargetNotFound(String),

    #[error("failed to deliver to target peer: {0}")]
    PushFailed(String),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room not found")]
    RoomNotFound,
}
