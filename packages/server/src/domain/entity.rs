//! Entity 定義
//!
//! - `Client`: 1 接続分のハンドル（識別情報と送信チャンネル）
//! - `Room`: ルームとメンバー表
//! - `Signal`: ピア間で中継される SDP / ICE メッセージ
//! - `Notification`: サーバーからクライアントへ送る通知

use std::{collections::HashMap, net::SocketAddr};

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{
    error::MessagePushError,
    message_pusher::PusherChannel,
    value_object::{PeerId, RoomId, Timestamp, Username},
};

/// ルームの参加者情報（ピア発見用の軽量な情報）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: PeerId,
    pub username: Username,
}

impl PeerInfo {
    pub fn new(id: PeerId, username: Username) -> Self {
        Self { id, username }
    }
}

/// 接続中のクライアント（Connection Handle）
///
/// `id` / `username` / `origin` は識別後に変化しない。
/// `current_room` はルームの参加・退出でのみ更新される（同時に 1 ルームまで）。
///
/// 送信は `sender`（unbounded channel）を経由し、接続ごとの送信タスクが
/// WebSocket に書き込む。複数タスクから同時に `send` しても書き込みは直列化される。
#[derive(Debug)]
pub struct Client {
    pub id: PeerId,
    pub username: Username,
    pub origin: SocketAddr,
    pub connected_at: Timestamp,
    /// 参加中のルーム
    ///
    /// ルーム移動の間は write lock を保持し続けること（切断処理との競合を防ぐ）。
    pub current_room: RwLock<Option<RoomId>>,
    sender: PusherChannel,
}

impl Client {
    pub fn new(
        id: PeerId,
        username: Username,
        origin: SocketAddr,
        connected_at: Timestamp,
        sender: PusherChannel,
    ) -> Self {
        Self {
            id,
            username,
            origin,
            connected_at,
            current_room: RwLock::new(None),
            sender,
        }
    }

    pub fn peer_info(&self) -> PeerInfo {
        PeerInfo::new(self.id.clone(), self.username.clone())
    }

    /// エンコード済みのメッセージを送信キューに積む
    pub fn send(&self, content: String) -> Result<(), MessagePushError> {
        self.sender
            .send(content)
            .map_err(|e| MessagePushError::PushFailed(format!("{}: {}", self.id, e)))
    }

    pub async fn room(&self) -> Option<RoomId> {
        self.current_room.read().await.clone()
    }

    /// 接続してから `now` までの経過時間（ミリ秒）
    pub fn session_millis(&self, now: Timestamp) -> i64 {
        (now.value() - self.connected_at.value()).max(0)
    }
}

/// ルーム
///
/// 最初の参加者が入った時点で作成され、最後の参加者が抜けた時点で削除される。
/// 空のルームは Repository に存在してはならない。
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub members: HashMap<PeerId, PeerInfo>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            members: HashMap::new(),
            created_at,
        }
    }

    /// 参加者を追加する（既存の場合は上書き）
    ///
    /// 新規に追加された場合は `true` を返す。
    pub fn add_member(&mut self, peer: PeerInfo) -> bool {
        self.members.insert(peer.id.clone(), peer).is_none()
    }

    pub fn remove_member(&mut self, peer_id: &PeerId) -> Option<PeerInfo> {
        self.members.remove(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.members.contains_key(peer_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// メンバー表（username, id の順でソート済み）
    pub fn roster(&self) -> Vec<PeerInfo> {
        let mut roster: Vec<PeerInfo> = self.members.values().cloned().collect();
        roster.sort_by(|a, b| {
            a.username
                .as_str()
                .cmp(b.username.as_str())
                .then_with(|| a.id.cmp(&b.id))
        });
        roster
    }

    /// 指定したピアを除いたメンバー表
    pub fn roster_excluding(&self, peer_id: &PeerId) -> Vec<PeerInfo> {
        self.roster()
            .into_iter()
            .filter(|peer| &peer.id != peer_id)
            .collect()
    }
}

/// ルームからの退出結果
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub room_id: RoomId,
    /// 退出後に残っているメンバー（空ならルームは削除済み）
    pub remaining: Vec<PeerInfo>,
}

/// ルーム参加（移動）の結果
#[derive(Debug, Clone, PartialEq)]
pub struct RoomTransition {
    pub room_id: RoomId,
    /// 参加したルームのメンバー表（自分を除く）
    pub roster: Vec<PeerInfo>,
    /// 別のルームから移動した場合の退出結果
    pub departure: Option<Departure>,
    /// 既に参加中のルームへの再参加か
    pub rejoined: bool,
}

/// シグナリングメッセージの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

/// 中継を依頼されたシグナリングメッセージ（送信者未確定）
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRequest {
    pub kind: SignalKind,
    pub to: PeerId,
    /// クライアントが自称した送信者（信用しない）
    pub claimed_from: Option<String>,
    /// SDP / ICE のペイロード（サーバーは解釈しない）
    pub payload: Map<String, Value>,
}

/// 中継されるシグナリングメッセージ
///
/// `from` は常にサーバーが認証した送信者。
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub from: PeerId,
    pub to: PeerId,
    pub payload: Map<String, Value>,
}

impl Signal {
    /// 送信者を認証済みのピアで上書きしてメッセージを確定する
    pub fn from_request(sender: &PeerId, request: SignalRequest) -> Self {
        Self {
            kind: request.kind,
            from: sender.clone(),
            to: request.to,
            payload: request.payload,
        }
    }
}

/// サーバーからクライアントへの通知
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    RoomMembers { room_id: RoomId, members: Vec<PeerInfo> },
    NewPeerInRoom { room_id: RoomId, peer: PeerInfo },
    PeerLeftRoom { room_id: RoomId, peer: PeerInfo },
    Signal(Signal),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(id: &str, username: &str) -> PeerInfo {
        PeerInfo::new(
            PeerId::new(id.to_string()).unwrap(),
            Username::new(username.to_string()).unwrap(),
        )
    }

    fn room() -> Room {
        Room::new(RoomId::new("r1".to_string()).unwrap(), Timestamp::new(1000))
    }

    #[test]
    fn test_add_member_overwrites_existing_entry() {
        // テスト項目: 同じピアを追加すると上書きされ、メンバー数は増えない
        // given (前提条件):
        let mut room = room();
        assert!(room.add_member(peer("p1", "alice")));

        // when (操作):
        let added = room.add_member(peer("p1", "alice"));

        // then (期待する結果):
        assert!(!added);
        assert_eq!(room.len(), 1);
    }

    #[test]
    fn test_roster_excluding_omits_self() {
        // テスト項目: 自分を除いたメンバー表が username 順で返される
        // given (前提条件):
        let mut room = room();
        room.add_member(peer("p3", "charlie"));
        room.add_member(peer("p1", "alice"));
        room.add_member(peer("p2", "bob"));

        // when (操作):
        let roster = room.roster_excluding(&PeerId::new("p2".to_string()).unwrap());

        // then (期待する結果):
        assert_eq!(roster, vec![peer("p1", "alice"), peer("p3", "charlie")]);
    }

    #[test]
    fn test_remove_member_until_empty() {
        // テスト項目: 全員が抜けるとルームは空になる
        // given (前提条件):
        let mut room = room();
        room.add_member(peer("p1", "alice"));

        // when (操作):
        let removed = room.remove_member(&PeerId::new("p1".to_string()).unwrap());

        // then (期待する結果):
        assert_eq!(removed, Some(peer("p1", "alice")));
        assert!(room.is_empty());
    }

    #[test]
    fn test_session_millis_measures_from_connected_at() {
        // テスト項目: 接続時刻からの経過時間が返され、時刻が巻き戻っても負にならない
        // given (前提条件):
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let client = Client::new(
            PeerId::new("p1".to_string()).unwrap(),
            Username::new("alice".to_string()).unwrap(),
            "127.0.0.1:50000".parse().unwrap(),
            Timestamp::new(1_000),
            tx,
        );

        // when (操作):
        let elapsed = client.session_millis(Timestamp::new(4_500));
        let rewound = client.session_millis(Timestamp::new(500));

        // then (期待する結果):
        assert_eq!(elapsed, 3_500);
        assert_eq!(rewound, 0);
    }

    #[test]
    fn test_signal_from_request_overwrites_claimed_sender() {
        // テスト項目: 自称の送信者は無視され、認証済みの送信者で上書きされる
        // given (前提条件):
        let sender = PeerId::new("alice-id".to_string()).unwrap();
        let mut payload = Map::new();
        payload.insert("sdp".to_string(), serde_json::json!({"type": "offer", "sdp": "v=0"}));
        let request = SignalRequest {
            kind: SignalKind::Offer,
            to: PeerId::new("bob-id".to_string()).unwrap(),
            claimed_from: Some("mallory-id".to_string()),
            payload: payload.clone(),
        };

        // when (操作):
        let signal = Signal::from_request(&sender, request);

        // then (期待する結果):
        assert_eq!(signal.from, sender);
        assert_eq!(signal.to.as_str(), "bob-id");
        assert_eq!(signal.payload, payload);
    }
}
