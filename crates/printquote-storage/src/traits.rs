//! Storage abstraction trait
//!
//! This module defines the Storage trait that byte stores must implement.

use async_trait::async_trait;
use bytes::Bytes;
use printquote_core::AppError;
use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Stored file {} not found", key)),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The slicing engine reads its input from disk, so every backend must be able
/// to hand out a local path for a key (`path_for`).
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `storage_key`, returning the local path of the file.
    async fn put(&self, storage_key: &str, data: Bytes) -> StorageResult<PathBuf>;

    /// Delete a file by its storage key. Deleting a missing key is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Get the size in bytes of a stored file.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Local filesystem path for a key (the file need not exist yet).
    fn path_for(&self, storage_key: &str) -> StorageResult<PathBuf>;
}
