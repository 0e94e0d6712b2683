//! WebSocket connection handlers.
//!
//! 1 接続 = 1 セッション。セッションは次の段階を順に進む。
//!
//! 1. 識別待ち: 最初のテキストメッセージは `IDENTIFY` でなければならない（タイムアウトあり）
//! 2. 識別済み: `JOIN_ROOM` / `SDP_OFFER` / `SDP_ANSWER` / `ICE_CANDIDATE` を受け付ける
//! 3. 終了: 登録簿から削除し、ルームの残りのメンバーに退出を通知する

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{
        Client, PeerIdFactory, PusherChannel, RoomId, SignalKind, Timestamp, Username,
        ValueObjectError,
    },
    infrastructure::dto::websocket::{ClientMessage, ServerMessage, SignalEnvelope},
    ui::state::AppState,
    usecase::IdentifyError,
};

use super::session::SessionGuard;

/// 識別（ハンドシェイク）の失敗理由
///
/// `Display` の内容がそのまま `AUTH_ERROR` の `message` になる。
#[derive(Debug, Error)]
enum HandshakeError {
    #[error("identification timed out")]
    Timeout,
    #[error("connection closed before identification")]
    Closed,
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("expected IDENTIFY as the first message")]
    UnexpectedMessage,
    #[error("{0}")]
    InvalidUsername(#[from] ValueObjectError),
    #[error("{0}")]
    Rejected(#[from] IdentifyError),
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(origin): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    tracing::info!("New connection from {}", origin);
    ws.on_upgrade(move |socket| handle_socket(socket, state, origin))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// All outbound frames of a connection go through this task, so concurrent
/// senders never interleave their writes. When every sender handle has been
/// dropped the queue is drained and a Close frame is sent.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(msg.into())).await {
                tracing::debug!("Failed to write to WebSocket: {}", e);
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, origin: SocketAddr) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);

    let client = match identify(&mut receiver, &state, origin, &tx).await {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Identification of {} failed: {}", origin, e);
            if !matches!(e, HandshakeError::Closed) {
                enqueue(&tx, &ServerMessage::auth_error(e.to_string()));
            }
            // 送信キューを閉じて AUTH_ERROR を送り切ってから接続を閉じる
            drop(tx);
            let _ = send_task.await;
            return;
        }
    };
    drop(tx);

    let guard = SessionGuard::new(client.clone(), state.disconnect_client_usecase.clone());

    enqueue_to(
        &client,
        &ServerMessage::auth_success(client.username.as_str(), client.id.as_str()),
    );

    tokio::select! {
        _ = read_loop(&mut receiver, &state, &client) => {}
        _ = &mut send_task => {
            tracing::debug!("Outbound channel of '{}' closed", client.username);
        }
    }

    guard.release().await;
    send_task.abort();
    tracing::info!("Session of '{}' ({}) ended", client.username, origin);
}

/// 識別ハンドシェイク
///
/// 成功した場合、クライアントは登録簿に登録済み。
async fn identify(
    receiver: &mut SplitStream<WebSocket>,
    state: &AppState,
    origin: SocketAddr,
    sender: &PusherChannel,
) -> Result<Arc<Client>, HandshakeError> {
    let text = tokio::time::timeout(state.identify_timeout, next_text(receiver))
        .await
        .map_err(|_| HandshakeError::Timeout)??;

    let username = match serde_json::from_str::<ClientMessage>(&text) {
        Ok(ClientMessage::Identify { username }) => username,
        Ok(_) => return Err(HandshakeError::UnexpectedMessage),
        Err(e) => return Err(HandshakeError::Malformed(e.to_string())),
    };
    let username = Username::new(username)?;

    let client = Arc::new(Client::new(
        PeerIdFactory::generate(),
        username,
        origin,
        Timestamp::now(),
        sender.clone(),
    ));
    state
        .identify_client_usecase
        .execute(client.clone())
        .await?;

    Ok(client)
}

/// 次のテキストメッセージを待つ（ping / pong は読み飛ばす）
async fn next_text(receiver: &mut SplitStream<WebSocket>) -> Result<String, HandshakeError> {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => return Ok(text.as_str().to_owned()),
            Ok(Message::Binary(_)) => {
                return Err(HandshakeError::Malformed(
                    "binary frames are not supported".to_string(),
                ));
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => return Err(HandshakeError::Closed),
            Err(e) => {
                tracing::debug!("WebSocket error before identification: {}", e);
                return Err(HandshakeError::Closed);
            }
        }
    }
    Err(HandshakeError::Closed)
}

async fn read_loop(
    receiver: &mut SplitStream<WebSocket>,
    state: &AppState,
    client: &Arc<Client>,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("WebSocket error from '{}': {}", client.username, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => dispatch(state, client, text.as_str()).await,
            Message::Binary(_) => {
                tracing::warn!("Ignoring binary frame from '{}'", client.username);
            }
            Message::Ping(_) => {
                tracing::debug!("Received ping");
            }
            Message::Pong(_) => {}
            Message::Close(_) => {
                tracing::info!("Client '{}' requested close", client.username);
                break;
            }
        }
    }
}

async fn dispatch(state: &AppState, client: &Arc<Client>, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(
                "Ignoring unparseable message from '{}': {}",
                client.username,
                e
            );
            return;
        }
    };

    match message {
        ClientMessage::JoinRoom { room_id } => match RoomId::new(room_id) {
            Ok(room_id) => {
                if let Err(e) = state.join_room_usecase.execute(client, room_id).await {
                    tracing::warn!("Join of '{}' failed: {}", client.username, e);
                }
            }
            Err(e) => {
                tracing::warn!("Ignoring JOIN_ROOM from '{}': {}", client.username, e);
            }
        },
        ClientMessage::SdpOffer(envelope) => relay(state, client, SignalKind::Offer, envelope).await,
        ClientMessage::SdpAnswer(envelope) => {
            relay(state, client, SignalKind::Answer, envelope).await
        }
        ClientMessage::IceCandidate(envelope) => {
            relay(state, client, SignalKind::IceCandidate, envelope).await
        }
        ClientMessage::Identify { .. } => {
            tracing::warn!("Ignoring repeated IDENTIFY from '{}'", client.username);
        }
        ClientMessage::ChatMessage { content } => {
            // チャットはピア間のデータチャネルで送られるため中継しない
            tracing::debug!(
                "Ignoring CHAT_MESSAGE from '{}' ({} bytes)",
                client.username,
                content.len()
            );
        }
    }
}

async fn relay(state: &AppState, client: &Client, kind: SignalKind, envelope: SignalEnvelope) {
    let request = match envelope.into_request(kind) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Ignoring {:?} from '{}': {}", kind, client.username, e);
            return;
        }
    };

    if let Err(e) = state.relay_signal_usecase.execute(client, request).await {
        tracing::warn!("Dropped {:?} from '{}': {}", kind, client.username, e);
    }
}

/// 識別前の接続にメッセージを送る
fn enqueue(sender: &PusherChannel, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(json) => {
            if sender.send(json).is_err() {
                tracing::debug!("Outbound channel already closed");
            }
        }
        Err(e) => tracing::error!("Failed to encode message: {}", e),
    }
}

fn enqueue_to(client: &Client, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(json) => {
            if let Err(e) = client.send(json) {
                tracing::debug!("Failed to queue message for '{}': {}", client.username, e);
            }
        }
        Err(e) => tracing::error!("Failed to encode message: {}", e),
    }
}
