//! Authenticated session manager for the remote store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use remote_store_core::auth::{self, Credentials};
use remote_store_core::traits::{
    RemoteStore, RemoteTransport, SessionToken, StoreError, Timestamp, TransportError,
};

/// Authenticated client for the remote synchronization server.
///
/// Owns the credentials and the current session token. Every façade operation
/// attaches the token as observed at call time; a session-expired response
/// triggers exactly one re-login followed by exactly one retry of the
/// operation, and nothing beyond that.
pub struct RemoteStoreClient<T>
where
    T: RemoteTransport,
{
    transport: T,
    credentials: Credentials,
    token: RwLock<SessionToken>,
}

impl<T> RemoteStoreClient<T>
where
    T: RemoteTransport,
{
    /// Construct a client by performing the initial login.
    ///
    /// # Errors
    /// Returns `StoreError::Auth` if the initial login fails; no client is
    /// handed out without a session.
    pub async fn connect(transport: T, credentials: Credentials) -> Result<Self, StoreError> {
        let client = Self {
            transport,
            credentials,
            token: RwLock::new(SessionToken::new()),
        };
        client.login().await?;
        Ok(client)
    }

    /// Authenticate against the server and replace the session token.
    ///
    /// The write guard is held across the whole exchange: concurrent logins
    /// serialize, and a fresh token cannot be clobbered by a stale response.
    /// On failure the previous token is left unchanged.
    ///
    /// # Errors
    /// Returns `StoreError::Auth` if the server rejects the login or the
    /// exchange fails.
    pub async fn login(&self) -> Result<(), StoreError> {
        let mut token = self.token.write().await;

        let salt = auth::generate_salt()?;
        let password_hash = auth::hash_password(&self.credentials.password, &salt);

        let response = self
            .transport
            .login(&self.credentials.username, &password_hash, &salt)
            .await
            .map_err(StoreError::Auth)?;

        debug!(
            username = %self.credentials.username,
            expires_at = response.expires_at,
            "session established"
        );

        *token = response.token;
        Ok(())
    }

    async fn current_token(&self) -> SessionToken {
        self.token.read().await.clone()
    }
}

#[async_trait]
impl<T> RemoteStore for RemoteStoreClient<T>
where
    T: RemoteTransport,
{
    async fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let mut retried = false;
        loop {
            let token = self.current_token().await;
            match self.transport.read(path, &token).await {
                Err(TransportError::SessionExpired) if !retried => {
                    retried = true;
                    debug!(path, "session expired, re-authenticating");
                    self.login().await?;
                }
                result => return result.map_err(StoreError::from),
            }
        }
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<(), StoreError> {
        let mut retried = false;
        loop {
            let token = self.current_token().await;
            match self.transport.write(path, data, &token).await {
                Err(TransportError::SessionExpired) if !retried => {
                    retried = true;
                    debug!(path, "session expired, re-authenticating");
                    self.login().await?;
                }
                result => return result.map_err(StoreError::from),
            }
        }
    }

    async fn last_modified(&self, path: &str) -> Result<Timestamp, StoreError> {
        let mut retried = false;
        loop {
            let token = self.current_token().await;
            match self.transport.last_modified(path, &token).await {
                Err(TransportError::SessionExpired) if !retried => {
                    retried = true;
                    debug!(path, "session expired, re-authenticating");
                    self.login().await?;
                }
                result => return result.map_err(StoreError::from),
            }
        }
    }

    async fn last_write(&self) -> Result<Timestamp, StoreError> {
        let mut retried = false;
        loop {
            let token = self.current_token().await;
            match self.transport.last_write(&token).await {
                Err(TransportError::SessionExpired) if !retried => {
                    retried = true;
                    debug!("session expired, re-authenticating");
                    self.login().await?;
                }
                result => return result.map_err(StoreError::from),
            }
        }
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let mut retried = false;
        loop {
            let token = self.current_token().await;
            match self.transport.read_dir(path, &token).await {
                Err(TransportError::SessionExpired) if !retried => {
                    retried = true;
                    debug!(path, "session expired, re-authenticating");
                    self.login().await?;
                }
                result => return result.map_err(StoreError::from),
            }
        }
    }
}
