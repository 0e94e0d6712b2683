//! UseCase: ルーム詳細取得

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository};

use super::error::GetRoomDetailError;

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    room_repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(room_repository: Arc<dyn RoomRepository>) -> Self {
        Self { room_repository }
    }

    /// ルーム詳細を取得
    ///
    /// 空になって削除されたルームは存在しないものとして扱う。
    pub async fn execute(&self, room_id: String) -> Result<Room, GetRoomDetailError> {
        let room_id = RoomId::new(room_id).map_err(|_| GetRoomDetailError::RoomNotFound)?;
        self.room_repository
            .get_room(&room_id)
            .await
            .map_err(|_| GetRoomDetailError::RoomNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{PeerId, PeerInfo, Username},
        infrastructure::repository::InMemoryRoomRepository,
    };

    fn alice() -> PeerInfo {
        PeerInfo::new(
            PeerId::new("alice-id".to_string()).unwrap(),
            Username::new("alice".to_string()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_get_existing_room() {
        // テスト項目: 存在するルームの詳細を取得できる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        repository
            .join(&RoomId::new("r1".to_string()).unwrap(), alice())
            .await;
        let usecase = GetRoomDetailUseCase::new(repository);

        // when (操作):
        let room = usecase.execute("r1".to_string()).await.unwrap();

        // then (期待する結果):
        assert_eq!(room.roster(), vec![alice()]);
    }

    #[tokio::test]
    async fn test_get_deleted_room() {
        // テスト項目: 空になって削除されたルームは RoomNotFound になる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let room_id = RoomId::new("r1".to_string()).unwrap();
        repository.join(&room_id, alice()).await;
        repository.leave(&room_id, &alice().id).await;
        let usecase = GetRoomDetailUseCase::new(repository);

        // when (操作):
        let result = usecase.execute("r1".to_string()).await;

        // then (期待する結果):
        assert_eq!(result, Err(GetRoomDetailError::RoomNotFound));
    }

    #[tokio::test]
    async fn test_get_room_with_empty_id() {
        // テスト項目: 空の ID は RoomNotFound になる
        // given (前提条件):
        let usecase = GetRoomDetailUseCase::new(Arc::new(InMemoryRoomRepository::new()));

        // when (操作):
        let result = usecase.execute(String::new()).await;

        // then (期待する結果):
        assert_eq!(result, Err(GetRoomDetailError::RoomNotFound));
    }
}
