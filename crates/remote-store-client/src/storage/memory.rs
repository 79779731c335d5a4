//! In-memory remote store.

use std::{collections::HashMap, sync::RwLock};

use async_trait::async_trait;
use remote_store_core::traits::{RemoteStore, StoreError, Timestamp};

use super::now_nanos;

struct Entry {
    data: Vec<u8>,
    modified_at: Timestamp,
}

/// In-memory store implementation.
///
/// Useful for consumer tests and single-process deployments.
/// Data is lost on drop.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    last_write: RwLock<Timestamp>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            last_write: RwLock::new(now_nanos()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.entries
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?
            .get(path)
            .map(|entry| entry.data.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_owned()))
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<(), StoreError> {
        let now = now_nanos();

        self.entries
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?
            .insert(
                path.to_owned(),
                Entry {
                    data: data.to_vec(),
                    modified_at: now,
                },
            );

        *self
            .last_write
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))? = now;

        Ok(())
    }

    async fn last_modified(&self, path: &str) -> Result<Timestamp, StoreError> {
        self.entries
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?
            .get(path)
            .map(|entry| entry.modified_at)
            .ok_or_else(|| StoreError::NotFound(path.to_owned()))
    }

    async fn last_write(&self) -> Result<Timestamp, StoreError> {
        Ok(*self
            .last_write
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?)
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        let mut prefix = path.to_owned();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }

        // Immediate children only, one name per subtree.
        let mut names: Vec<String> = entries
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(|rest| rest.split('/').next().unwrap_or(rest).to_owned())
            .collect();

        names.sort_unstable();
        names.dedup();

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let store = MemoryStore::new();
        store.write("/sync/state", b"payload").await.unwrap();

        let data = store.read("/sync/state").await.unwrap();
        assert_eq!(data, b"payload");
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let store = MemoryStore::new();
        let err = store.read("/nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = store.last_modified("/nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_write_advances_last_write() {
        let store = MemoryStore::new();
        let before = store.last_write().await.unwrap();

        store.write("/a", b"x").await.unwrap();
        let after = store.last_write().await.unwrap();

        assert!(after >= before);
        assert_eq!(store.last_modified("/a").await.unwrap(), after);
    }

    #[tokio::test]
    async fn test_read_dir_lists_immediate_children_sorted() {
        let store = MemoryStore::new();
        store.write("/dir/b", b"1").await.unwrap();
        store.write("/dir/a", b"2").await.unwrap();
        store.write("/dir/sub/c", b"3").await.unwrap();
        store.write("/other/d", b"4").await.unwrap();

        let names = store.read_dir("/dir").await.unwrap();
        assert_eq!(names, ["a", "b", "sub"]);
    }
}
