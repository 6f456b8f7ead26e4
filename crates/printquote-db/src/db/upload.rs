//! Upload record repository: file id -> `UploadRecord`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use printquote_core::models::UploadRecord;
use printquote_core::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record {0} already exists")]
    Duplicate(String),

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Internal(format!("Upload record store error: {}", err))
    }
}

/// Keyed record store for upload metadata.
///
/// Implementations do not interpret `expires_at`; expiry policy belongs to the
/// upload service so that "expired" and "never existed" stay distinguishable.
#[async_trait]
pub trait UploadRepository: Send + Sync {
    async fn insert(&self, record: UploadRecord) -> Result<(), RepositoryError>;

    async fn get(&self, file_id: &str) -> Result<Option<UploadRecord>, RepositoryError>;

    /// Remove a record, returning it if it was present.
    async fn delete(&self, file_id: &str) -> Result<Option<UploadRecord>, RepositoryError>;

    /// Records whose `expires_at` is strictly before `now`.
    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<UploadRecord>, RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}

/// Process-local upload store backed by a `HashMap`.
#[derive(Clone, Default)]
pub struct InMemoryUploadRepository {
    records: Arc<RwLock<HashMap<String, UploadRecord>>>,
}

impl InMemoryUploadRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UploadRepository for InMemoryUploadRepository {
    #[tracing::instrument(skip(self, record), fields(file_id = %record.file_id))]
    async fn insert(&self, record: UploadRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.file_id) {
            return Err(RepositoryError::Duplicate(record.file_id));
        }
        records.insert(record.file_id.clone(), record);
        Ok(())
    }

    async fn get(&self, file_id: &str) -> Result<Option<UploadRecord>, RepositoryError> {
        Ok(self.records.read().await.get(file_id).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, file_id: &str) -> Result<Option<UploadRecord>, RepositoryError> {
        Ok(self.records.write().await.remove(file_id))
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<UploadRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.is_expired_at(now))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use printquote_core::models::ModelExtension;
    use std::path::PathBuf;

    fn record(file_id: &str, expires_in: Duration) -> UploadRecord {
        let now = Utc::now();
        UploadRecord {
            file_id: file_id.to_string(),
            storage_key: format!("{}.stl", file_id),
            file_path: PathBuf::from(format!("/tmp/{}.stl", file_id)),
            file_name: "cube.stl".to_string(),
            file_size_bytes: 684,
            file_extension: ModelExtension::Stl,
            created_at: now,
            expires_at: now + expires_in,
        }
    }

    #[tokio::test]
    async fn insert_get_delete() {
        let repo = InMemoryUploadRepository::new();
        repo.insert(record("a", Duration::hours(1))).await.unwrap();

        let fetched = repo.get("a").await.unwrap().unwrap();
        assert_eq!(fetched.file_size_bytes, 684);
        assert!(repo.get("missing").await.unwrap().is_none());

        assert!(repo.delete("a").await.unwrap().is_some());
        assert!(repo.delete("a").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let repo = InMemoryUploadRepository::new();
        repo.insert(record("dup", Duration::hours(1))).await.unwrap();
        let err = repo
            .insert(record("dup", Duration::hours(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(id) if id == "dup"));
    }

    #[tokio::test]
    async fn list_expired_only_returns_past_records() {
        let repo = InMemoryUploadRepository::new();
        repo.insert(record("old", Duration::hours(-2))).await.unwrap();
        repo.insert(record("fresh", Duration::hours(2))).await.unwrap();

        let expired = repo.list_expired(Utc::now()).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].file_id, "old");
    }

    #[tokio::test]
    async fn clones_share_state() {
        let repo = InMemoryUploadRepository::new();
        let other = repo.clone();
        repo.insert(record("shared", Duration::hours(1))).await.unwrap();
        assert!(other.get("shared").await.unwrap().is_some());
    }
}
