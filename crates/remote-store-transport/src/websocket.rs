//! WebSocket-backed transport for the remote synchronization server.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info};

use remote_store_core::traits::{LoginResponse, RemoteTransport, Timestamp, TransportError};

use crate::protocol::{ErrorCode, StoreRequest, StoreResponse};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport for the remote store.
///
/// Each RPC is one request/response exchange of JSON text frames on a
/// persistent connection. Exchanges are serialized behind an async mutex, so
/// concurrent callers queue rather than interleave frames.
pub struct WsTransport {
    stream: Mutex<WsStream>,
}

impl WsTransport {
    /// Connect to a remote store server at the given WebSocket URL.
    ///
    /// # Errors
    /// Returns an error if the connection or handshake fails.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connection(format!("WebSocket connect failed: {e}")))?;

        info!("Connected to remote store at {url}");

        Ok(Self {
            stream: Mutex::new(stream),
        })
    }

    /// Send one request and read its response.
    async fn exchange(&self, request: StoreRequest) -> Result<StoreResponse, TransportError> {
        let mut stream = self.stream.lock().await;

        let method = request.method();
        let json = serde_json::to_string(&request)
            .map_err(|e| TransportError::Protocol(format!("encode request: {e}")))?;

        stream
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| TransportError::Connection(format!("send failed: {e}")))?;

        debug!("Sent {method} request");

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    let response: StoreResponse = serde_json::from_str(text.as_str())
                        .map_err(|e| TransportError::Protocol(format!("decode response: {e}")))?;

                    debug!("Received response for {method}");

                    return match response {
                        StoreResponse::Error { code, message } => Err(map_error(code, message)),
                        response => Ok(response),
                    };
                }
                // Keepalive frames; tungstenite queues the pong reply itself.
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => {
                    return Err(TransportError::Connection(
                        "connection closed by server".to_owned(),
                    ));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(TransportError::Connection(e.to_string())),
            }
        }
    }
}

/// Map a server error code onto the transport error taxonomy.
///
/// `invalid_token` maps to [`TransportError::SessionExpired`] so the client's
/// retry path can match it structurally.
fn map_error(code: ErrorCode, message: String) -> TransportError {
    match code {
        ErrorCode::InvalidToken => TransportError::SessionExpired,
        ErrorCode::Unauthorized => TransportError::Unauthorized(message),
        code => TransportError::Server {
            code: code.as_str().to_owned(),
            message,
        },
    }
}

fn unexpected(method: &str, response: &StoreResponse) -> TransportError {
    TransportError::Protocol(format!("unexpected response to {method}: {response:?}"))
}

#[async_trait]
impl RemoteTransport for WsTransport {
    async fn login(
        &self,
        username: &str,
        password_hash: &[u8],
        salt: &[u8],
    ) -> Result<LoginResponse, TransportError> {
        let response = self
            .exchange(StoreRequest::login(username, password_hash, salt))
            .await?;
        match &response {
            StoreResponse::Token { expires_at, .. } => {
                let token = response.decode_token().ok_or_else(|| {
                    TransportError::Protocol("token field is not valid base64".to_owned())
                })?;
                Ok(LoginResponse {
                    token,
                    expires_at: *expires_at,
                })
            }
            _ => Err(unexpected("login", &response)),
        }
    }

    async fn read(&self, path: &str, token: &[u8]) -> Result<Vec<u8>, TransportError> {
        let response = self.exchange(StoreRequest::read(path, token)).await?;
        match &response {
            StoreResponse::Data { .. } => response.decode_data().ok_or_else(|| {
                TransportError::Protocol("data field is not valid base64".to_owned())
            }),
            _ => Err(unexpected("read", &response)),
        }
    }

    async fn write(&self, path: &str, data: &[u8], token: &[u8]) -> Result<(), TransportError> {
        let response = self.exchange(StoreRequest::write(path, data, token)).await?;
        match response {
            StoreResponse::Ack => Ok(()),
            response => Err(unexpected("write", &response)),
        }
    }

    async fn last_modified(&self, path: &str, token: &[u8]) -> Result<Timestamp, TransportError> {
        let response = self
            .exchange(StoreRequest::last_modified(path, token))
            .await?;
        match response {
            StoreResponse::Timestamp { nanos } => Ok(nanos),
            response => Err(unexpected("last_modified", &response)),
        }
    }

    async fn last_write(&self, token: &[u8]) -> Result<Timestamp, TransportError> {
        let response = self.exchange(StoreRequest::last_write(token)).await?;
        match response {
            StoreResponse::Timestamp { nanos } => Ok(nanos),
            response => Err(unexpected("last_write", &response)),
        }
    }

    async fn read_dir(&self, path: &str, token: &[u8]) -> Result<Vec<String>, TransportError> {
        let response = self.exchange(StoreRequest::read_dir(path, token)).await?;
        match response {
            StoreResponse::Entries { entries } => Ok(entries),
            response => Err(unexpected("read_dir", &response)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_token_maps_to_sentinel() {
        let err = map_error(ErrorCode::InvalidToken, "token invalid".to_owned());
        assert!(matches!(err, TransportError::SessionExpired));
    }

    #[test]
    fn test_unauthorized_maps_to_unauthorized() {
        let err = map_error(ErrorCode::Unauthorized, "bad credentials".to_owned());
        match err {
            TransportError::Unauthorized(msg) => assert_eq!(msg, "bad credentials"),
            other => panic!("wrong mapping: {other:?}"),
        }
    }

    #[test]
    fn test_other_codes_stay_server_errors() {
        let err = map_error(ErrorCode::NotFound, "no such path".to_owned());
        match err {
            TransportError::Server { code, message } => {
                assert_eq!(code, "not_found");
                assert_eq!(message, "no such path");
            }
            other => panic!("wrong mapping: {other:?}"),
        }
    }
}
