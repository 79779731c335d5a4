//! Transport layer for the remote synchronization server.
//!
//! Provides:
//! - Wire protocol (JSON + base64)
//! - WebSocket transport implementing `RemoteTransport`

pub mod protocol;
pub mod websocket;

pub use protocol::{ErrorCode, StoreRequest, StoreResponse};
pub use websocket::WsTransport;
