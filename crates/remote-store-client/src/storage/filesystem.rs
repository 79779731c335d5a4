//! Filesystem-backed remote store.

use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::RwLock,
    time::UNIX_EPOCH,
};

use async_trait::async_trait;
use tokio::fs;

use remote_store_core::traits::{RemoteStore, StoreError, Timestamp};

/// Remote store over a local directory.
///
/// Stands in for the synchronization server in tests and offline use: the
/// same façade contract, backed by file I/O under a base directory. Leading
/// slashes in store paths are relative to the base directory.
pub struct FileStore {
    base_dir: PathBuf,
    // Most recent successful write through this instance; a fresh instance
    // falls back to the base directory's mtime.
    last_write: RwLock<Option<Timestamp>>,
}

impl FileStore {
    /// Create a store rooted at `base_dir`. The directory is created on the
    /// first write if it does not exist.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            last_write: RwLock::new(None),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path.trim_start_matches('/'))
    }
}

fn mtime_nanos(metadata: &std::fs::Metadata) -> Result<Timestamp, StoreError> {
    let modified = metadata.modified()?;
    let nanos = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|e| StoreError::Internal(format!("modification time before epoch: {e}")))?
        .as_nanos() as Timestamp;
    Ok(nanos)
}

fn map_not_found(err: std::io::Error, path: &str) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound(path.to_owned())
    } else {
        err.into()
    }
}

#[async_trait]
impl RemoteStore for FileStore {
    async fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        fs::read(self.resolve(path))
            .await
            .map_err(|e| map_not_found(e, path))
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<(), StoreError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full, data).await?;

        let metadata = fs::metadata(&full).await?;
        let nanos = mtime_nanos(&metadata)?;
        *self
            .last_write
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))? = Some(nanos);

        Ok(())
    }

    async fn last_modified(&self, path: &str) -> Result<Timestamp, StoreError> {
        let metadata = fs::metadata(self.resolve(path))
            .await
            .map_err(|e| map_not_found(e, path))?;
        mtime_nanos(&metadata)
    }

    async fn last_write(&self) -> Result<Timestamp, StoreError> {
        let recorded = *self
            .last_write
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        if let Some(nanos) = recorded {
            return Ok(nanos);
        }

        let metadata = fs::metadata(&self.base_dir).await?;
        mtime_nanos(&metadata)
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let mut dir = fs::read_dir(self.resolve(path))
            .await
            .map_err(|e| map_not_found(e, path))?;

        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort_unstable();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write("/nested/blob", b"payload").await.unwrap();
        let data = store.read("/nested/blob").await.unwrap();
        assert_eq!(data, b"payload");
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let err = store.read("/nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = store.read_dir("/nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_last_modified_tracks_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write("/blob", b"v1").await.unwrap();
        let modified = store.last_modified("/blob").await.unwrap();
        assert!(modified > 0);
        assert_eq!(store.last_write().await.unwrap(), modified);
    }

    #[tokio::test]
    async fn test_last_write_falls_back_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        // No writes through this instance yet.
        let nanos = store.last_write().await.unwrap();
        assert!(nanos > 0);
    }

    #[tokio::test]
    async fn test_read_dir_returns_sorted_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write("/d/b", b"1").await.unwrap();
        store.write("/d/a", b"2").await.unwrap();
        store.write("/d/c", b"3").await.unwrap();

        let names = store.read_dir("/d").await.unwrap();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
