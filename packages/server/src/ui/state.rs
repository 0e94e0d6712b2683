//! Server state shared by all connections.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    DisconnectClientUseCase, GetRoomDetailUseCase, GetRoomsUseCase, IdentifyClientUseCase,
    JoinRoomUseCase, RelaySignalUseCase,
};

/// Shared application state
pub struct AppState {
    /// IdentifyClientUseCase（クライアント識別のユースケース）
    pub identify_client_usecase: Arc<IdentifyClientUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// RelaySignalUseCase（シグナリングメッセージ中継のユースケース）
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    /// DisconnectClientUseCase（クライアント切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// How long a new connection may take to send IDENTIFY
    pub identify_timeout: Duration,
}
