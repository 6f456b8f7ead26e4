use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage over a single flat directory.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating `base_path` if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path.
    ///
    /// The store is flat: a key is a single file name, so separators and `..`
    /// are rejected outright and the key can never escape the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.contains('/')
            || storage_key.contains('\\')
            || storage_key.contains('\0')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, storage_key: &str, data: Bytes) -> StorageResult<PathBuf> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let written = async {
            file.write_all(&data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup_err) = fs::remove_file(&path).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %cleanup_err,
                    "Failed to remove partially written file"
                );
            }
            return Err(StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::debug!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(path)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), key = %storage_key, "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn content_length(&self, storage_key: &str) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn path_for(&self, storage_key: &str) -> StorageResult<PathBuf> {
        self.key_to_path(storage_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn put_measure_delete() {
        let (_dir, storage) = store().await;
        let path = storage
            .put("1_abc.stl", Bytes::from_static(b"solid cube"))
            .await
            .unwrap();

        assert!(path.ends_with("1_abc.stl"));
        assert_eq!(std::fs::read(&path).unwrap(), b"solid cube");
        assert_eq!(storage.content_length("1_abc.stl").await.unwrap(), 10);

        storage.delete("1_abc.stl").await.unwrap();
        assert!(!path.exists());
        // idempotent
        storage.delete("1_abc.stl").await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (_dir, storage) = store().await;
        assert!(matches!(
            storage.content_length("nope.stl").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (_dir, storage) = store().await;
        for key in ["../escape.stl", "nested/file.stl", "..", "", "a\\b.stl"] {
            assert!(
                matches!(storage.path_for(key), Err(StorageError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn new_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = LocalStorage::new(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.base_path(), nested.as_path());
    }
}
