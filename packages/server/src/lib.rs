//! WebRTC signaling relay library.
//!
//! Clients connect over WebSocket, identify themselves with a username, join
//! rooms to discover each other and exchange SDP offers/answers and ICE
//! candidates that the server forwards to a named peer.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
