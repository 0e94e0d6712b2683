//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! どちらの Repository も各操作はアトミックであること。
//! 並行して呼ばれた操作が、途中まで適用された状態を観測してはならない。

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    entity::{Client, Departure, PeerInfo, Room, RoomTransition},
    error::RepositoryError,
    value_object::{PeerId, RoomId, Username},
};

/// Client Repository trait（接続中クライアントの登録簿）
///
/// PeerId → Client と Username → Client の 2 つの対応を常に一致した状態で保持する。
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// クライアントを登録
    ///
    /// 表示名が使用中の場合は `RepositoryError::NameTaken` を返し、何も変更しない。
    async fn register(&self, client: Arc<Client>) -> Result<(), RepositoryError>;

    /// PeerId でクライアントを検索
    async fn find_by_id(&self, peer_id: &PeerId) -> Result<Arc<Client>, RepositoryError>;

    /// 表示名でクライアントを検索
    async fn find_by_username(&self, username: &Username)
    -> Result<Arc<Client>, RepositoryError>;

    /// 複数の PeerId をまとめて検索（見つからないものはスキップ）
    async fn find_many(&self, peer_ids: &[PeerId]) -> Vec<Arc<Client>>;

    /// クライアントを削除
    ///
    /// 冪等。存在しないクライアントの削除は何もしない。
    async fn remove(&self, peer_id: &PeerId, username: &Username);

    /// 接続中のクライアント数
    async fn count(&self) -> usize;
}

/// Room Repository trait（ルームとメンバー表の登録簿）
///
/// ルームは最初の参加で作成され、空になった時点で削除される。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームに参加し、自分を除いたメンバー表を返す
    async fn join(&self, room_id: &RoomId, peer: PeerInfo) -> Vec<PeerInfo>;

    /// ルームから退出
    ///
    /// 参加していなかった場合は `None`。
    async fn leave(&self, room_id: &RoomId, peer_id: &PeerId) -> Option<Departure>;

    /// `from` からの退出と `to` への参加を 1 つの操作として行う
    ///
    /// 他のクライアントから、両方のルームに同時に所属している状態が見えることはない。
    async fn switch_room(
        &self,
        from: Option<&RoomId>,
        to: &RoomId,
        peer: PeerInfo,
    ) -> RoomTransition;

    /// ルームを取得
    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError>;

    /// 全ルームのスナップショットを取得（ID 順）
    async fn get_rooms(&self) -> Vec<Room>;
}
