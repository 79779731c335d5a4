//! Credentials and login hashing.

use sha2::{Digest, Sha256};

use crate::traits::StoreError;

/// Salt length in bytes, fixed by the login protocol.
pub const SALT_LEN: usize = 32;

/// Username and password for the remote synchronization server.
///
/// Held for the lifetime of the client and used only during login; the
/// password itself never goes on the wire.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Generate a fresh login salt from the OS CSPRNG.
///
/// # Errors
/// Returns an error if the system random source is unavailable.
pub fn generate_salt() -> Result<[u8; SALT_LEN], StoreError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt)
        .map_err(|e| StoreError::Internal(format!("getrandom failed: {e}")))?;
    Ok(salt)
}

/// Hash a password for a login request: `SHA-256(password ∥ salt)`.
#[must_use]
pub fn hash_password(password: &str, salt: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_is_fresh_per_call() {
        let a = generate_salt().unwrap();
        let b = generate_salt().unwrap();
        assert_eq!(a.len(), SALT_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_covers_password_and_salt() {
        let salt = [7u8; SALT_LEN];
        let hash = hash_password("hunter2", &salt);

        // Equivalent to hashing the concatenated bytes in one shot.
        let mut concat = b"hunter2".to_vec();
        concat.extend_from_slice(&salt);
        let expected: [u8; 32] = Sha256::digest(&concat).into();
        assert_eq!(hex::encode(hash), hex::encode(expected));

        // A different salt must change the hash.
        assert_ne!(hash, hash_password("hunter2", &[8u8; SALT_LEN]));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
