//! Store backends implementing the façade contract directly.

use std::time::{SystemTime, UNIX_EPOCH};

use remote_store_core::traits::Timestamp;

pub mod filesystem;
pub mod memory;

pub use filesystem::FileStore;
pub use memory::MemoryStore;

pub(crate) fn now_nanos() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as Timestamp)
        .unwrap_or(0)
}
