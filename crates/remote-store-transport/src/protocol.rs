//! Wire protocol for client-server communication.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

/// Request from client to server. Binary fields travel base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreRequest {
    /// Authenticate and obtain a session token.
    Login {
        username: String,
        password_hash: String,
        salt: String,
    },
    /// Read the blob at `path`.
    Read { path: String, token: String },
    /// Write a blob to `path`.
    Write {
        path: String,
        data: String,
        token: String,
    },
    /// Last modification time of `path`.
    LastModified { path: String, token: String },
    /// Time of the most recent successful write.
    LastWrite { token: String },
    /// Entry names under `path`.
    ReadDir { path: String, token: String },
}

impl StoreRequest {
    /// Build a login request from raw hash and salt bytes.
    #[must_use]
    pub fn login(username: &str, password_hash: &[u8], salt: &[u8]) -> Self {
        Self::Login {
            username: username.to_owned(),
            password_hash: BASE64.encode(password_hash),
            salt: BASE64.encode(salt),
        }
    }

    /// Build a read request.
    #[must_use]
    pub fn read(path: &str, token: &[u8]) -> Self {
        Self::Read {
            path: path.to_owned(),
            token: BASE64.encode(token),
        }
    }

    /// Build a write request from raw data bytes.
    #[must_use]
    pub fn write(path: &str, data: &[u8], token: &[u8]) -> Self {
        Self::Write {
            path: path.to_owned(),
            data: BASE64.encode(data),
            token: BASE64.encode(token),
        }
    }

    /// Build a last-modified request.
    #[must_use]
    pub fn last_modified(path: &str, token: &[u8]) -> Self {
        Self::LastModified {
            path: path.to_owned(),
            token: BASE64.encode(token),
        }
    }

    /// Build a last-write request.
    #[must_use]
    pub fn last_write(token: &[u8]) -> Self {
        Self::LastWrite {
            token: BASE64.encode(token),
        }
    }

    /// Build a read-dir request.
    #[must_use]
    pub fn read_dir(path: &str, token: &[u8]) -> Self {
        Self::ReadDir {
            path: path.to_owned(),
            token: BASE64.encode(token),
        }
    }

    /// Wire name of the request's method, for logging.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Read { .. } => "read",
            Self::Write { .. } => "write",
            Self::LastModified { .. } => "last_modified",
            Self::LastWrite { .. } => "last_write",
            Self::ReadDir { .. } => "read_dir",
        }
    }
}

/// Error codes the server attaches to failed requests.
///
/// `InvalidToken` is the session-expired sentinel: clients match it exactly
/// to decide whether to re-authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Session token invalid, login required.
    InvalidToken,
    /// Login rejected (bad credentials or unknown user).
    Unauthorized,
    /// No entry at the requested path.
    NotFound,
    /// Request could not be decoded.
    BadRequest,
    /// Unspecified server-side failure.
    Internal,
}

impl ErrorCode {
    /// Stable wire name of the code, for error messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid_token",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::Internal => "internal",
        }
    }
}

/// Response from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreResponse {
    /// Login succeeded.
    Token { token: String, expires_at: i64 },
    /// Read succeeded.
    Data { data: String },
    /// Write acknowledged.
    Ack,
    /// Timestamp result, ns since epoch.
    Timestamp { nanos: i64 },
    /// Directory listing result.
    Entries { entries: Vec<String> },
    /// Request failed.
    Error { code: ErrorCode, message: String },
}

impl StoreResponse {
    /// Decode the token of a `Token` response.
    #[must_use]
    pub fn decode_token(&self) -> Option<Vec<u8>> {
        if let Self::Token { token, .. } = self {
            BASE64.decode(token).ok()
        } else {
            None
        }
    }

    /// Decode the payload of a `Data` response.
    #[must_use]
    pub fn decode_data(&self) -> Option<Vec<u8>> {
        if let Self::Data { data } = self {
            BASE64.decode(data).ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_roundtrip() {
        let original = b"blob contents";
        let msg = StoreResponse::Data {
            data: BASE64.encode(original),
        };
        let decoded = msg.decode_data().unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_request_serialization() {
        let msg = StoreRequest::read("/sync/state", b"tok");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"read\""));

        let parsed: StoreRequest = serde_json::from_str(&json).unwrap();
        if let StoreRequest::Read { path, token } = parsed {
            assert_eq!(path, "/sync/state");
            assert_eq!(BASE64.decode(token).unwrap(), b"tok");
        } else {
            panic!("Wrong request type");
        }
    }

    #[test]
    fn test_sentinel_code_is_identity_matched() {
        // The retry path keys on the deserialized code, not on message text.
        let json = r#"{"type":"error","code":"invalid_token","message":"token invalid, login required"}"#;
        let parsed: StoreResponse = serde_json::from_str(json).unwrap();
        match parsed {
            StoreResponse::Error { code, .. } => assert_eq!(code, ErrorCode::InvalidToken),
            _ => panic!("Wrong response type"),
        }
    }

    #[test]
    fn test_login_request_encodes_binary_fields() {
        let msg = StoreRequest::login("alice", &[0xde, 0xad], &[0xbe, 0xef]);
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: StoreRequest = serde_json::from_str(&json).unwrap();
        if let StoreRequest::Login {
            username,
            password_hash,
            salt,
        } = parsed
        {
            assert_eq!(username, "alice");
            assert_eq!(BASE64.decode(password_hash).unwrap(), [0xde, 0xad]);
            assert_eq!(BASE64.decode(salt).unwrap(), [0xbe, 0xef]);
        } else {
            panic!("Wrong request type");
        }
    }
}
