//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{Room, RoomRepository};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    room_repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(room_repository: Arc<dyn RoomRepository>) -> Self {
        Self { room_repository }
    }

    /// 現在存在するルームの一覧（ID 順）
    pub async fn execute(&self) -> Vec<Room> {
        self.room_repository.get_rooms().await
    }
}
