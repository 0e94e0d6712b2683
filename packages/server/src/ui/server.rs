//! Server execution logic.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{
    DisconnectClientUseCase, GetRoomDetailUseCase, GetRoomsUseCase, IdentifyClientUseCase,
    JoinRoomUseCase, RelaySignalUseCase,
};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// 待ち受けアドレスとセッションの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 接続から `IDENTIFY` を受け取るまでの猶予
    pub identify_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            identify_timeout: Duration::from_secs(10),
        }
    }
}

/// WebRTC signaling server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     identify_client_usecase,
///     join_room_usecase,
///     relay_signal_usecase,
///     disconnect_client_usecase,
///     get_rooms_usecase,
///     get_room_detail_usecase,
///     ServerConfig::default(),
/// );
/// server.run().await?;
/// ```
pub struct Server {
    identify_client_usecase: Arc<IdentifyClientUseCase>,
    join_room_usecase: Arc<JoinRoomUseCase>,
    relay_signal_usecase: Arc<RelaySignalUseCase>,
    disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    get_rooms_usecase: Arc<GetRoomsUseCase>,
    get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    config: ServerConfig,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `identify_client_usecase` - UseCase for the identification handshake
    /// * `join_room_usecase` - UseCase for joining and switching rooms
    /// * `relay_signal_usecase` - UseCase for relaying SDP / ICE messages
    /// * `disconnect_client_usecase` - UseCase for session cleanup
    /// * `get_rooms_usecase` - UseCase for getting rooms list
    /// * `get_room_detail_usecase` - UseCase for getting room detail
    /// * `config` - Listen address and session settings
    pub fn new(
        identify_client_usecase: Arc<IdentifyClientUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        relay_signal_usecase: Arc<RelaySignalUseCase>,
        disconnect_client_usecase: Arc<DisconnectClientUseCase>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
        config: ServerConfig,
    ) -> Self {
        Self {
            identify_client_usecase,
            join_room_usecase,
            relay_signal_usecase,
            disconnect_client_usecase,
            get_rooms_usecase,
            get_room_detail_usecase,
            config,
        }
    }

    /// Run the signaling server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Signaling server listening on {}", listener.local_addr()?);

        let app = self.router();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
    }

    fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            identify_client_usecase: self.identify_client_usecase,
            join_room_usecase: self.join_room_usecase,
            relay_signal_usecase: self.relay_signal_usecase,
            disconnect_client_usecase: self.disconnect_client_usecase,
            get_rooms_usecase: self.get_rooms_usecase,
            get_room_detail_usecase: self.get_room_detail_usecase,
            identify_timeout: self.config.identify_timeout,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }
}
