//! UseCase: クライアント切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - 登録簿からの削除、ルームからの退出、残りのメンバーへの退出通知
//!
//! ### なぜこのテストが必要か
//! - 切断後に登録簿やルームに残ったエントリは、中継の宛先やメンバー表に幽霊として現れる
//! - 切断処理は複数の経路から重複して呼ばれうるため、冪等でなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム参加中のクライアントの切断
//! - エッジケース：最後のメンバーの切断（ルームが削除される）
//! - エッジケース：切断処理の重複実行

use std::sync::Arc;

use crate::domain::{
    Client, ClientRepository, Departure, MessagePusher, Notification, RoomRepository, Timestamp,
};

use super::notify_members;

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    room_repository: Arc<dyn RoomRepository>,
    client_repository: Arc<dyn ClientRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectClientUseCase {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        client_repository: Arc<dyn ClientRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            room_repository,
            client_repository,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// 冪等。2 回目以降の呼び出しは何もしない。
    ///
    /// # Returns
    ///
    /// 参加中のルームから退出した場合はその結果
    pub async fn execute(&self, client: &Client) -> Option<Departure> {
        self.client_repository
            .remove(&client.id, &client.username)
            .await;

        let room = client.current_room.write().await.take();
        let departure = match room {
            Some(room_id) => self.room_repository.leave(&room_id, &client.id).await,
            None => None,
        };

        if let Some(departure) = &departure {
            tracing::info!("Client '{}' left room '{}'", client.username, departure.room_id);
            let left = Notification::PeerLeftRoom {
                room_id: departure.room_id.clone(),
                peer: client.peer_info(),
            };
            notify_members(
                &self.client_repository,
                &self.message_pusher,
                &departure.remaining,
                &left,
            )
            .await;
        }

        tracing::info!(
            "Client '{}' ({}) disconnected after {} ms, {} clients remaining",
            client.username,
            client.origin,
            client.session_millis(Timestamp::now()),
            self.client_repository.count().await
        );

        departure
    }
}
