//! Core abstractions for the authenticated remote-store client.
//!
//! This crate provides the fundamental building blocks:
//! - `RemoteStore` - The façade contract the synchronized-KV layer consumes
//! - `RemoteTransport` - The RPC capability the client is built on
//! - `Credentials` and login hashing
//! - The store/transport error taxonomy

pub mod auth;
pub mod traits;

pub use auth::Credentials;
pub use traits::{RemoteStore, RemoteTransport, SessionToken, StoreError, TransportError};
