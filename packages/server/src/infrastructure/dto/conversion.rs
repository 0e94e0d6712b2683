//! Conversion logic between DTOs and domain entities.

use kakehashi_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{
    Notification, PeerId, PeerInfo, Room, Signal, SignalKind, SignalRequest, ValueObjectError,
};
use crate::infrastructure::dto::{
    http::{RoomDetailDto, RoomSummaryDto},
    websocket::{PeerInfoDto, ServerMessage, SignalEnvelope},
};

// ========================================
// DTO → Domain Entity
// ========================================

impl SignalEnvelope {
    /// Convert into a relay request.
    ///
    /// The client-supplied `fromPeerId` is kept only as a claim; the relay
    /// replaces it with the authenticated sender.
    pub fn into_request(self, kind: SignalKind) -> Result<SignalRequest, ValueObjectError> {
        let to = PeerId::new(self.to_peer_id)?;
        let claimed_from = Some(self.from_peer_id).filter(|from| !from.is_empty());
        Ok(SignalRequest {
            kind,
            to,
            claimed_from,
            payload: self.payload,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&PeerInfo> for PeerInfoDto {
    fn from(model: &PeerInfo) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            username: model.username.as_str().to_string(),
        }
    }
}

impl From<&Signal> for SignalEnvelope {
    fn from(model: &Signal) -> Self {
        Self {
            from_peer_id: model.from.as_str().to_string(),
            to_peer_id: model.to.as_str().to_string(),
            payload: model.payload.clone(),
        }
    }
}

impl From<&Notification> for ServerMessage {
    fn from(model: &Notification) -> Self {
        match model {
            Notification::RoomMembers { room_id, members } => Self::RoomMembers {
                room_id: room_id.as_str().to_string(),
                members: members.iter().map(PeerInfoDto::from).collect(),
            },
            Notification::NewPeerInRoom { room_id, peer } => Self::NewPeerInRoom {
                room_id: room_id.as_str().to_string(),
                peer: peer.into(),
            },
            Notification::PeerLeftRoom { room_id, peer } => Self::PeerLeftRoom {
                room_id: room_id.as_str().to_string(),
                peer: peer.into(),
            },
            Notification::Signal(signal) => {
                let envelope = SignalEnvelope::from(signal);
                match signal.kind {
                    SignalKind::Offer => Self::SdpOffer(envelope),
                    SignalKind::Answer => Self::SdpAnswer(envelope),
                    SignalKind::IceCandidate => Self::IceCandidate(envelope),
                }
            }
        }
    }
}

impl From<&Room> for RoomSummaryDto {
    fn from(model: &Room) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            members: model
                .roster()
                .into_iter()
                .map(|peer| peer.username.into_string())
                .collect(),
            created_at: timestamp_to_jst_rfc3339(model.created_at.value()),
        }
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(model: &Room) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            members: model.roster().iter().map(PeerInfoDto::from).collect(),
            created_at: timestamp_to_jst_rfc3339(model.created_at.value()),
        }
    }
}
