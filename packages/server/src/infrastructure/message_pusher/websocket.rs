//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - ドメインの `Notification` を `ServerMessage`（JSON）にエンコード
//! - クライアントの送信キューへの書き込み（push, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket への実際の書き込みは UI 層（`ui/handler/websocket.rs`）の送信タスクが行います。
//! この実装はキューに積むだけなので、複数タスクから同時に呼ばれても書き込みは直列化されます。

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{Client, MessagePushError, MessagePusher, Notification},
    infrastructure::dto::websocket::ServerMessage,
};

/// WebSocket を使った MessagePusher 実装
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketMessagePusher;

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self
    }

    fn encode(notification: &Notification) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerMessage::from(notification))
            .map_err(|e| MessagePushError::Encode(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn push(
        &self,
        client: &Client,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let content = Self::encode(notification)?;
        client.send(content)?;
        tracing::debug!("Pushed message to client '{}'", client.username);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<Arc<Client>>,
        notification: &Notification,
    ) -> Result<usize, MessagePushError> {
        let content = Self::encode(notification)?;

        let mut delivered = 0;
        for target in targets {
            // ブロードキャストでは一部の送信失敗を許容
            match target.send(content.clone()) {
                Ok(()) => {
                    delivered += 1;
                    tracing::debug!("Broadcasted message to client '{}'", target.username);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to push message to client '{}': {}",
                        target.username,
                        e
                    );
                }
            }
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PeerIdFactory, PeerInfo, RoomId, Timestamp, Username};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push: 特定のクライアントへの送信
    // - broadcast: 複数クライアントへの送信
    // - 接続が閉じたクライアントへの送信失敗
    //
    // 【どのようなシナリオをテストするか】
    // 1. push の成功ケース
    // 2. push の失敗ケース（受信側が閉じている）
    // 3. broadcast の部分失敗ケース（1 件失敗しても残りに届く）
    // ========================================

    fn create_client(username: &str) -> (Arc<Client>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Arc::new(Client::new(
            PeerIdFactory::generate(),
            Username::new(username.to_string()).unwrap(),
            "127.0.0.1:50000".parse().unwrap(),
            Timestamp::new(1000),
            tx,
        ));
        (client, rx)
    }

    fn joined(peer: PeerInfo) -> Notification {
        Notification::NewPeerInRoom {
            room_id: RoomId::new("r1".to_string()).unwrap(),
            peer,
        }
    }

    #[tokio::test]
    async fn test_push_success() {
        // テスト項目: 特定のクライアントに JSON エンコードされた通知が届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, mut rx) = create_client("alice");
        let (bob, _bob_rx) = create_client("bob");

        // when (操作):
        let result = pusher.push(&alice, &joined(bob.peer_info())).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let received: serde_json::Value =
            serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(received["type"], "NEW_PEER_IN_ROOM");
        assert_eq!(received["roomId"], "r1");
        assert_eq!(received["peer"]["username"], "bob");
        assert_eq!(received["peer"]["id"], bob.id.as_str());
    }

    #[tokio::test]
    async fn test_push_to_closed_client_fails() {
        // テスト項目: 受信側が閉じたクライアントへの送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, rx) = create_client("alice");
        drop(rx);

        // when (操作):
        let result = pusher.push(&alice, &joined(alice.peer_info())).await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::PushFailed(_))));
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: ブロードキャスト時、一部のクライアントへの送信が失敗しても残りには届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, alice_rx) = create_client("alice");
        let (bob, mut bob_rx) = create_client("bob");
        let (carol, mut carol_rx) = create_client("carol");
        drop(alice_rx);

        // when (操作):
        let result = pusher
            .broadcast(
                vec![alice.clone(), bob.clone(), carol.clone()],
                &joined(alice.peer_info()),
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(2));
        assert!(bob_rx.recv().await.is_some());
        assert!(carol_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_broadcast_empty_targets() {
        // テスト項目: 空のターゲットリストでもエラーにならない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, _rx) = create_client("alice");

        // when (操作):
        let result = pusher.broadcast(vec![], &joined(alice.peer_info())).await;

        // then (期待する結果):
        assert_eq!(result, Ok(0));
    }
}
