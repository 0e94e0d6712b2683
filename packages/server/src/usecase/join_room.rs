//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 参加者本人へのメンバー表の送信、既存メンバーへの参加通知
//! - ルーム移動時の旧ルームへの退出通知
//!
//! ### なぜこのテストが必要か
//! - ピア同士はこの通知をきっかけに P2P 接続を開始する
//! - 通知漏れ・二重通知はそのまま接続の失敗・重複につながる
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のルームへの参加、既存メンバーのいるルームへの参加
//! - 正常系：別のルームからの移動
//! - エッジケース：参加中のルームへの再参加（参加通知を送らない）

use std::sync::Arc;

use crate::domain::{
    Client, ClientRepository, MessagePusher, Notification, RoomId, RoomRepository, RoomTransition,
};

use super::{error::JoinRoomError, notify_members};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    room_repository: Arc<dyn RoomRepository>,
    client_repository: Arc<dyn ClientRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
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

    /// ルーム参加を実行
    ///
    /// 別のルームに参加中であれば先に退出する（退出と参加は 1 つの操作として行われる）。
    ///
    /// 1. 旧ルームの残りのメンバーに `PeerLeftRoom` を通知
    /// 2. 参加者本人に `RoomMembers`（自分を除くメンバー表）を送信
    /// 3. 新ルームの既存メンバーに `NewPeerInRoom` を通知（再参加の場合は送らない）
    pub async fn execute(
        &self,
        client: &Client,
        room_id: RoomId,
    ) -> Result<RoomTransition, JoinRoomError> {
        let transition = {
            let mut current_room = client.current_room.write().await;
            let transition = self
                .room_repository
                .switch_room(current_room.as_ref(), &room_id, client.peer_info())
                .await;
            *current_room = Some(room_id.clone());
            transition
        };

        if let Some(departure) = &transition.departure {
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
            "Client '{}' joined room '{}' ({} other members)",
            client.username,
            room_id,
            transition.roster.len()
        );

        let members = Notification::RoomMembers {
            room_id: room_id.clone(),
            members: transition.roster.clone(),
        };
        self.message_pusher
            .push(client, &members)
            .await
            .map_err(|e| JoinRoomError::NotifyFailed(e.to_string()))?;

        if !transition.rejoined {
            let joined = Notification::NewPeerInRoom {
                room_id,
                peer: client.peer_info(),
            };
            notify_members(
                &self.client_repository,
                &self.message_pusher,
                &transition.roster,
                &joined,
            )
            .await;
        }

        Ok(transition)
    }
}
