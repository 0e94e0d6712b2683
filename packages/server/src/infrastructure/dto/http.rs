//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::PeerInfoDto;

/// Room summary for the room list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    /// Usernames of the current members
    pub members: Vec<String>,
    pub created_at: String,
}

/// Room detail for the room detail endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub members: Vec<PeerInfoDto>,
    pub created_at: String,
}
