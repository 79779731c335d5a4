//! Authenticated client and store backends for the remote store.
//!
//! Provides:
//! - `RemoteStoreClient` - Session-managed façade over a `RemoteTransport`
//! - Store backends implementing the façade directly (filesystem, memory)

pub mod manager;
pub mod storage;

pub use manager::RemoteStoreClient;
pub use storage::{FileStore, MemoryStore};
