//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! 全ルームを 1 つの Mutex で保護します。
//! 空になったルームの削除とルーム移動（退出 + 参加）は、同じロックの中で完結させること。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Departure, PeerId, PeerInfo, RepositoryError, Room, RoomId, RoomRepository, RoomTransition,
    Timestamp,
};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, Room>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// ルームに参加する（ルームがなければ作成）
///
/// 戻り値は (自分を除いたメンバー表, 既に参加していたか)。
fn insert_member(
    rooms: &mut HashMap<RoomId, Room>,
    room_id: &RoomId,
    peer: PeerInfo,
) -> (Vec<PeerInfo>, bool) {
    let room = rooms.entry(room_id.clone()).or_insert_with(|| {
        tracing::info!("Room '{}' created", room_id);
        Room::new(room_id.clone(), Timestamp::now())
    });
    let peer_id = peer.id.clone();
    let rejoined = !room.add_member(peer);
    (room.roster_excluding(&peer_id), rejoined)
}

/// ルームから退出する（空になったルームは削除）
fn remove_member(
    rooms: &mut HashMap<RoomId, Room>,
    room_id: &RoomId,
    peer_id: &PeerId,
) -> Option<Departure> {
    let room = rooms.get_mut(room_id)?;
    room.remove_member(peer_id)?;

    let remaining = room.roster();
    if room.is_empty() {
        rooms.remove(room_id);
        tracing::info!("Room '{}' is empty and has been deleted", room_id);
    }

    Some(Departure {
        room_id: room_id.clone(),
        remaining,
    })
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn join(&self, room_id: &RoomId, peer: PeerInfo) -> Vec<PeerInfo> {
        let mut rooms = self.rooms.lock().await;
        let (roster, _) = insert_member(&mut rooms, room_id, peer);
        roster
    }

    async fn leave(&self, room_id: &RoomId, peer_id: &PeerId) -> Option<Departure> {
        let mut rooms = self.rooms.lock().await;
        remove_member(&mut rooms, room_id, peer_id)
    }

    async fn switch_room(
        &self,
        from: Option<&RoomId>,
        to: &RoomId,
        peer: PeerInfo,
    ) -> RoomTransition {
        let mut rooms = self.rooms.lock().await;

        let departure = match from {
            Some(old) if old != to => remove_member(&mut rooms, old, &peer.id),
            _ => None,
        };
        let (roster, rejoined) = insert_member(&mut rooms, to, peer);

        RoomTransition {
            room_id: to.clone(),
            roster,
            departure,
            rejoined,
        }
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))
    }

    async fn get_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        let mut snapshot: Vec<Room> = rooms.values().cloned().collect();
        snapshot.sort_by(|a, b| a.id.cmp(&b.id));
        snapshot
    }
}
