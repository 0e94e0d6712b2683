//! UseCase: クライアント識別処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - IdentifyClientUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 表示名の一意性は識別時にのみ保証される
//!
//! ### どのような状況を想定しているか
//! - 正常系：新しい表示名での識別
//! - 異常系：接続中のクライアントと同じ表示名での識別

use std::sync::Arc;

use crate::domain::{Client, ClientRepository, RepositoryError};

use super::error::IdentifyError;

/// クライアント識別のユースケース
pub struct IdentifyClientUseCase {
    /// Repository（接続中クライアントの登録簿）
    client_repository: Arc<dyn ClientRepository>,
}

impl IdentifyClientUseCase {
    pub fn new(client_repository: Arc<dyn ClientRepository>) -> Self {
        Self { client_repository }
    }

    /// クライアントを登録する
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 識別成功（以後 `client.id` 宛てのメッセージが中継される）
    /// * `Err(IdentifyError::NameTaken)` - 表示名が使用中
    pub async fn execute(&self, client: Arc<Client>) -> Result<(), IdentifyError> {
        let peer_id = client.id.clone();
        let username = client.username.clone();

        self.client_repository
            .register(client)
            .await
            .map_err(|e| match e {
                RepositoryError::NameTaken(name) => IdentifyError::NameTaken(name),
                other => IdentifyError::Repository(other.to_string()),
            })?;

        tracing::info!("Client '{}' identified as '{}'", peer_id, username);
        Ok(())
    }
}
