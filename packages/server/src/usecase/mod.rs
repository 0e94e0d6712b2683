//! UseCase layer
//!
//! アプリケーションのユースケース（ビジネスロジックのフロー）を実装します。
//! Domain layer の trait にのみ依存し、具体的な実装には依存しません。

mod disconnect_client;
mod error;
mod get_room_detail;
mod get_rooms;
mod identify_client;
mod join_room;
mod relay_signal;

use std::sync::Arc;

use crate::domain::{ClientRepository, MessagePusher, Notification, PeerInfo};

pub use disconnect_client::DisconnectClientUseCase;
pub use error::{GetRoomDetailError, IdentifyError, JoinRoomError, RelayError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use identify_client::IdentifyClientUseCase;
pub use join_room::JoinRoomUseCase;
pub use relay_signal::RelaySignalUseCase;

/// ルームのメンバーに通知をブロードキャストする
///
/// 既に切断済みのメンバーはスキップする。送信失敗は他のメンバーへの送信を妨げない。
async fn notify_members(
    client_repository: &Arc<dyn ClientRepository>,
    message_pusher: &Arc<dyn MessagePusher>,
    members: &[PeerInfo],
    notification: &Notification,
) {
    if members.is_empty() {
        return;
    }

    let peer_ids: Vec<_> = members.iter().map(|peer| peer.id.clone()).collect();
    let targets = client_repository.find_many(&peer_ids).await;
    if let Err(e) = message_pusher.broadcast(targets, notification).await {
        tracing::warn!("Failed to broadcast notification: {}", e);
    }
}
