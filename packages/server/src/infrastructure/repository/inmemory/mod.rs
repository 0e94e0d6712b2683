//! InMemory Repository 実装
//!
//! 各 Repository は 1 つの Mutex で全状態を保護する（粗粒度ロック）。

pub mod client;
pub mod room;

pub use client::InMemoryClientRepository;
pub use room::InMemoryRoomRepository;
