//! MessagePusher trait 定義
//!
//! クライアントへの通知（push）のインターフェース。
//! 具体的なエンコード（JSON）と送信方法は Infrastructure 層が提供します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    entity::{Client, Notification},
    error::MessagePushError,
};

/// クライアントごとの送信キュー
///
/// エンコード済みのテキストメッセージを、接続ごとの送信タスクへ渡す。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// - `push`: 特定のクライアントへの送信（失敗は呼び出し元に返す）
/// - `broadcast`: 複数クライアントへの送信（一部の送信失敗は許容し、残りへの送信を継続する）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 特定のクライアントに通知を送信
    async fn push(&self, client: &Client, notification: &Notification)
    -> Result<(), MessagePushError>;

    /// 複数のクライアントに通知を送信
    ///
    /// 送信に成功したクライアント数を返す。
    async fn broadcast(
        &self,
        targets: Vec<Arc<Client>>,
        notification: &Notification,
    ) -> Result<usize, MessagePushError>;
}
