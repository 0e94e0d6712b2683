//! WebSocket message DTOs.
//!
//! Every message is a JSON object whose `type` field is the discriminator.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Peer information exchanged for discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfoDto {
    pub id: String,
    pub username: String,
}

/// Signaling message body shared by SDP_OFFER, SDP_ANSWER and ICE_CANDIDATE.
///
/// Everything except the addressing fields (`sdp`, `iceCandidate`, ...) is kept
/// in `payload` and forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalEnvelope {
    /// Claimed sender. Anything other than a string is read as empty.
    #[serde(default, deserialize_with = "lenient_peer_id")]
    pub from_peer_id: String,
    pub to_peer_id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

fn lenient_peer_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => Ok(value),
        _ => Ok(String::new()),
    }
}

/// Messages sent from a client to the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    Identify { username: String },
    JoinRoom { room_id: String },
    SdpOffer(SignalEnvelope),
    SdpAnswer(SignalEnvelope),
    IceCandidate(SignalEnvelope),
    ChatMessage { content: String },
}

/// Result of the identification handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Success,
    Error,
}

/// Messages sent from the server to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    AuthSuccess {
        status: AuthStatus,
        username: String,
        peer_id: String,
    },
    AuthError {
        status: AuthStatus,
        message: String,
    },
    RoomMembers {
        room_id: String,
        members: Vec<PeerInfoDto>,
    },
    NewPeerInRoom {
        room_id: String,
        peer: PeerInfoDto,
    },
    PeerLeftRoom {
        room_id: String,
        peer: PeerInfoDto,
    },
    SdpOffer(SignalEnvelope),
    SdpAnswer(SignalEnvelope),
    IceCandidate(SignalEnvelope),
}

impl ServerMessage {
    pub fn auth_success(username: impl Into<String>, peer_id: impl Into<String>) -> Self {
        Self::AuthSuccess {
            status: AuthStatus::Success,
            username: username.into(),
            peer_id: peer_id.into(),
        }
    }

    pub fn auth_error(message: impl Into<String>) -> Self {
        Self::AuthError {
            status: AuthStatus::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_identify() {
        // テスト項目: IDENTIFY メッセージをパースできる
        // given (前提条件):
        let text = r#"{"type":"IDENTIFY","username":"alice"}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            msg,
            ClientMessage::Identify {
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_parse_join_room_uses_camel_case() {
        // テスト項目: JOIN_ROOM の roomId フィールドをパースできる
        // given (前提条件):
        let text = r#"{"type":"JOIN_ROOM","roomId":"r1"}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            msg,
            ClientMessage::JoinRoom {
                room_id: "r1".to_string()
            }
        );
    }

    #[test]
    fn test_parse_ice_candidate_keeps_payload() {
        // テスト項目: ICE_CANDIDATE の宛先以外のフィールドがペイロードとして保持される
        // given (前提条件):
        let text = json!({
            "type": "ICE_CANDIDATE",
            "fromPeerId": "spoofed",
            "toPeerId": "bob-id",
            "iceCandidate": {"candidate": "candidate:1 1 udp", "sdpMid": "0", "sdpMLineIndex": 0}
        })
        .to_string();

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(&text).unwrap();

        // then (期待する結果):
        let ClientMessage::IceCandidate(envelope) = msg else {
            panic!("unexpected message: {msg:?}");
        };
        assert_eq!(envelope.from_peer_id, "spoofed");
        assert_eq!(envelope.to_peer_id, "bob-id");
        assert_eq!(envelope.payload.len(), 1);
        assert_eq!(
            envelope.payload["iceCandidate"]["candidate"],
            json!("candidate:1 1 udp")
        );
    }

    #[test]
    fn test_parse_signal_without_from_peer_id() {
        // テスト項目: fromPeerId が省略された SDP_OFFER もパースできる
        // given (前提条件):
        let text = r#"{"type":"SDP_OFFER","toPeerId":"bob-id","sdp":{"type":"offer","sdp":"v=0"}}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        let ClientMessage::SdpOffer(envelope) = msg else {
            panic!("unexpected message: {msg:?}");
        };
        assert_eq!(envelope.from_peer_id, "");
        assert_eq!(envelope.payload["sdp"]["sdp"], json!("v=0"));
    }

    #[test]
    fn test_parse_signal_with_non_string_from_peer_id() {
        // テスト項目: fromPeerId が null や文字列以外でもパースでき、送信者の自称は空として扱われる
        // given (前提条件):
        let claims = [json!(null), json!(42), json!({"id": "mallory"})];

        for claim in claims {
            let text = json!({
                "type": "SDP_OFFER",
                "fromPeerId": claim,
                "toPeerId": "bob-id",
                "sdp": {"type": "offer", "sdp": "v=0"}
            })
            .to_string();

            // when (操作):
            let msg: ClientMessage = serde_json::from_str(&text).unwrap();

            // then (期待する結果):
            let ClientMessage::SdpOffer(envelope) = msg else {
                panic!("unexpected message: {msg:?}");
            };
            assert_eq!(envelope.from_peer_id, "");
            assert_eq!(envelope.to_peer_id, "bob-id");
            assert_eq!(envelope.payload.len(), 1);
            assert_eq!(envelope.payload["sdp"]["type"], json!("offer"));
        }
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        // テスト項目: 未知の type はパースエラーになる
        // given (前提条件):
        let text = r#"{"type":"SHOUT","content":"hi"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientMessage>(text);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_auth_messages() {
        // テスト項目: AUTH_SUCCESS / AUTH_ERROR が期待する JSON になる
        // given (前提条件):
        let success = ServerMessage::auth_success("alice", "alice-id");
        let error = ServerMessage::auth_error("username is already taken");

        // when (操作):
        let success_json = serde_json::to_value(&success).unwrap();
        let error_json = serde_json::to_value(&error).unwrap();

        // then (期待する結果):
        assert_eq!(
            success_json,
            json!({"type": "AUTH_SUCCESS", "status": "success", "username": "alice", "peerId": "alice-id"})
        );
        assert_eq!(
            error_json,
            json!({"type": "AUTH_ERROR", "status": "error", "message": "username is already taken"})
        );
    }

    #[test]
    fn test_serialize_sdp_answer() {
        // テスト項目: SDP_ANSWER がペイロードを展開した JSON になる
        // given (前提条件):
        let mut payload = Map::new();
        payload.insert("sdp".to_string(), json!({"type": "answer", "sdp": "v=0"}));
        let msg = ServerMessage::SdpAnswer(SignalEnvelope {
            from_peer_id: "bob-id".to_string(),
            to_peer_id: "alice-id".to_string(),
            payload,
        });

        // when (操作):
        let value = serde_json::to_value(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({
                "type": "SDP_ANSWER",
                "fromPeerId": "bob-id",
                "toPeerId": "alice-id",
                "sdp": {"type": "answer", "sdp": "v=0"}
            })
        );
    }
}
