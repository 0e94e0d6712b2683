//! Kakehashi signaling server.
//!
//! Peers identify with a username, join rooms, and exchange WebRTC offers,
//! answers and ICE candidates through this server. Media and chat flow
//! peer-to-peer once the connection is established.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kakehashi-server
//! cargo run --bin kakehashi-server -- --host 0.0.0.0 --port 3000
//! KAKEHASHI_IDENTIFY_TIMEOUT_SECS=30 cargo run --bin kakehashi-server
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;

use kakehashi_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryClientRepository, InMemoryRoomRepository},
    },
    ui::{Server, ServerConfig},
    usecase::{
        DisconnectClientUseCase, GetRoomDetailUseCase, GetRoomsUseCase, IdentifyClientUseCase,
        JoinRoomUseCase, RelaySignalUseCase,
    },
};
use kakehashi_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kakehashi-server")]
#[command(about = "WebRTC signaling server over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "KAKEHASHI_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "KAKEHASHI_PORT", default_value = "8080")]
    port: u16,

    /// Seconds a new connection may take to send IDENTIFY
    #[arg(long, env = "KAKEHASHI_IDENTIFY_TIMEOUT_SECS", default_value = "10")]
    identify_timeout_secs: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "KAKEHASHI_LOG_LEVEL", default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repositories (in-memory registries)
    let client_repository = Arc::new(InMemoryClientRepository::new());
    let room_repository = Arc::new(InMemoryRoomRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let identify_client_usecase =
        Arc::new(IdentifyClientUseCase::new(client_repository.clone()));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        room_repository.clone(),
        client_repository.clone(),
        message_pusher.clone(),
    ));
    let relay_signal_usecase = Arc::new(RelaySignalUseCase::new(
        client_repository.clone(),
        message_pusher.clone(),
    ));
    let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(
        room_repository.clone(),
        client_repository.clone(),
        message_pusher.clone(),
    ));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(room_repository.clone()));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(room_repository.clone()));

    // 4. Create and run Server
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        identify_timeout: Duration::from_secs(args.identify_timeout_secs),
    };
    let server = Server::new(
        identify_client_usecase,
        join_room_usecase,
        relay_signal_usecase,
        disconnect_client_usecase,
        get_rooms_usecase,
        get_room_detail_usecase,
        config,
    );

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
