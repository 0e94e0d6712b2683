//! UseCase: シグナリングメッセージ中継処理（Relay Router）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelaySignalUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 送信者のなりすまし防止：`fromPeerId` は常に認証済みの送信者で上書きされる
//! - ペイロード（SDP / ICE）は解釈せずそのまま転送されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続中のピアへの中継
//! - 異常系：存在しないピアへの中継（破棄され、送信者には影響しない）
//! - 異常系：宛先の接続が閉じている

use std::sync::Arc;

use crate::domain::{
    Client, ClientRepository, MessagePusher, Notification, PeerId, Signal, SignalRequest,
};

use super::error::RelayError;

/// シグナリングメッセージ中継のユースケース
///
/// 状態を持たない。宛先の検索は ClientRepository、送信は MessagePusher に委譲する。
pub struct RelaySignalUseCase {
    client_repository: Arc<dyn ClientRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    pub fn new(
        client_repository: Arc<dyn ClientRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            client_repository,
            message_pusher,
        }
    }

    /// シグナリングメッセージを宛先のピアに中継する
    ///
    /// 配送確認はないため、エラーは送信者には返さずログに残すだけにすること。
    ///
    /// # Returns
    ///
    /// * `Ok(PeerId)` - 中継先のピア
    /// * `Err(RelayError)` - 宛先が存在しない、または送信に失敗した
    pub async fn execute(
        &self,
        sender: &Client,
        request: SignalRequest,
    ) -> Result<PeerId, RelayError> {
        if let Some(claimed) = request
            .claimed_from
            .as_deref()
            .filter(|claimed| *claimed != sender.id.as_str())
        {
            tracing::warn!(
                "Client '{}' claimed to be '{}', overwriting sender",
                sender.id,
                claimed
            );
        }

        let signal = Signal::from_request(&sender.id, request);
        let target = self
            .client_repository
            .find_by_id(&signal.to)
            .await
            .map_err(|_| RelayError::TargetNotFound(signal.to.as_str().to_string()))?;

        let kind = signal.kind;
        self.message_pusher
            .push(&target, &Notification::Signal(signal))
            .await
            .map_err(|e| RelayError::PushFailed(e.to_string()))?;

        tracing::debug!(
            "Relayed {:?} from '{}' to '{}'",
            kind,
            sender.username,
            target.username
        );
        Ok(target.id.clone())
    }
}
