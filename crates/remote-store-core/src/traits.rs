//! Core traits for the remote store and its transport.

use async_trait::async_trait;
use thiserror::Error;

/// Opaque session token issued by the remote server at login.
pub type SessionToken = Vec<u8>;

/// Nanoseconds since the Unix epoch, as reported by the server.
pub type Timestamp = i64;

/// Successful login result.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    /// Session token to attach to subsequent requests.
    pub token: SessionToken,
    /// Expiry of the token, nanoseconds since the Unix epoch.
    pub expires_at: Timestamp,
}

/// Transport-level error.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server rejected the session token. Exactly this variant, and no
    /// other, triggers re-authentication in the client.
    #[error("session expired, login required")]
    SessionExpired,
    #[error("authentication rejected: {0}")]
    Unauthorized(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("server error ({code}): {message}")]
    Server { code: String, message: String },
}

/// Store-level error surfaced to façade callers.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A login attempt failed. Fatal to the triggering call; never retried.
    #[error("login failed: {0}")]
    Auth(#[source] TransportError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("entry not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Trait for the RPC capability the client consumes but does not implement.
///
/// One network-backed implementation talks to the synchronization server;
/// tests script an in-memory mock against the same seam.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Authenticate and obtain a fresh session token.
    async fn login(
        &self,
        username: &str,
        password_hash: &[u8],
        salt: &[u8],
    ) -> Result<LoginResponse, TransportError>;

    /// Read the blob stored at `path`.
    async fn read(&self, path: &str, token: &[u8]) -> Result<Vec<u8>, TransportError>;

    /// Write `data` to `path`. The server acknowledges, nothing is returned.
    async fn write(&self, path: &str, data: &[u8], token: &[u8]) -> Result<(), TransportError>;

    /// Last modification time of the entry at `path`.
    async fn last_modified(&self, path: &str, token: &[u8]) -> Result<Timestamp, TransportError>;

    /// Time of the most recent successful write the server received.
    async fn last_write(&self, token: &[u8]) -> Result<Timestamp, TransportError>;

    /// Entry names under `path`.
    async fn read_dir(&self, path: &str, token: &[u8]) -> Result<Vec<String>, TransportError>;
}

/// Trait for remote-store backends.
///
/// This is the surface the synchronized key-value layer consumes. The
/// authenticated client implements it over [`RemoteTransport`]; the
/// filesystem and in-memory stores implement it directly.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the blob stored at `path`.
    async fn read(&self, path: &str) -> Result<Vec<u8>, StoreError>;

    /// Write `data` to `path`.
    async fn write(&self, path: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Last modification time of the entry at `path`, ns since epoch.
    async fn last_modified(&self, path: &str) -> Result<Timestamp, StoreError>;

    /// Time of the most recent successful write, ns since epoch.
    async fn last_write(&self) -> Result<Timestamp, StoreError>;

    /// Entry names under `path`.
    async fn read_dir(&self, path: &str) -> Result<Vec<String>, StoreError>;
}
