//! Domain layer
//!
//! ビジネスルールとドメインモデルを定義します。
//! 外部ライブラリ（axum, WebSocket など）には依存しません。

pub mod entity;
pub mod error;
pub mod factory;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{
    Client, Departure, Notification, PeerInfo, Room, RoomTransition, Signal, SignalKind,
    SignalRequest,
};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use factory::PeerIdFactory;
pub use message_pusher::{MessagePusher, PusherChannel};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use repository::{ClientRepository, RoomRepository};
pub use value_object::{PeerId, RoomId, Timestamp, Username};
