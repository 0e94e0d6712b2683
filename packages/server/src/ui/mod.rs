//! UI layer
//!
//! WebSocket / HTTP のエンドポイントとサーバーの起動処理。

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, ServerConfig};
