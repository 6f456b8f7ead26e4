use bytes::Bytes;
use chrono::Utc;
use printquote_core::models::{ModelExtension, UploadRecord};
use printquote_core::validation::{sanitize_file_name, validate_file_id, validate_upload_size};
use printquote_core::{generate_file_id, AppError, StorageSettings};
use printquote_db::UploadRepository;
use printquote_storage::{upload_key, Storage};
use std::sync::Arc;

/// Temporary upload store: bytes in [`Storage`], metadata in an
/// [`UploadRepository`]. The repository is the source of truth for
/// whether an upload exists.
#[derive(Clone)]
pub struct UploadService {
    repository: Arc<dyn UploadRepository>,
    storage: Arc<dyn Storage>,
    settings: StorageSettings,
}

impl UploadService {
    pub fn new(
        repository: Arc<dyn UploadRepository>,
        storage: Arc<dyn Storage>,
        settings: StorageSettings,
    ) -> Self {
        Self {
            repository,
            storage,
            settings,
        }
    }

    pub fn settings(&self) -> &StorageSettings {
        &self.settings
    }

    /// Validate and store an uploaded model.
    ///
    /// Extension and size are checked before any byte is written. If the
    /// record cannot be persisted the written bytes are removed again.
    #[tracing::instrument(skip(self, data), fields(file_name = %file_name, size = data.len()))]
    pub async fn put(&self, data: Bytes, file_name: &str) -> Result<UploadRecord, AppError> {
        let file_name = sanitize_file_name(file_name);
        let extension = ModelExtension::from_filename(&file_name)?;
        validate_upload_size(data.len() as u64, self.settings.max_upload_bytes)?;

        let file_id = generate_file_id();
        let storage_key = upload_key(&file_id, extension);
        let size = data.len() as u64;

        let file_path = self.storage.put(&storage_key, data).await?;

        let created_at = Utc::now();
        let record = UploadRecord {
            file_id: file_id.clone(),
            storage_key: storage_key.clone(),
            file_path,
            file_name,
            file_size_bytes: size,
            file_extension: extension,
            created_at,
            expires_at: created_at + self.settings.upload_ttl(),
        };

        if let Err(e) = self.repository.insert(record.clone()).await {
            tracing::error!(
                error = %e,
                file_id = %file_id,
                "Failed to persist upload record, removing stored bytes"
            );
            if let Err(cleanup_err) = self.storage.delete(&storage_key).await {
                tracing::error!(
                    error = %cleanup_err,
                    storage_key = %storage_key,
                    "Failed to remove orphaned upload"
                );
            }
            return Err(e.into());
        }

        tracing::info!(
            file_id = %record.file_id,
            extension = %extension,
            size,
            expires_at = %record.expires_at,
            "Upload stored"
        );
        Ok(record)
    }

    /// Resolve an upload. Expired records are reported as `Gone` until the
    /// sweeper removes them.
    pub async fn get(&self, file_id: &str) -> Result<UploadRecord, AppError> {
        validate_file_id(file_id)?;
        let record = self
            .repository
            .get(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", file_id)))?;

        if record.is_expired() {
            tracing::debug!(file_id = %file_id, expires_at = %record.expires_at, "Upload expired");
            return Err(AppError::Gone(format!(
                "Upload {} has expired, please upload the file again",
                file_id
            )));
        }
        Ok(record)
    }

    /// Whether the stored bytes still match the record.
    pub async fn bytes_present(&self, record: &UploadRecord) -> Result<bool, AppError> {
        match self.storage.content_length(&record.storage_key).await {
            Ok(len) => Ok(len == record.file_size_bytes),
            Err(printquote_storage::StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a record and its bytes. Returns whether a record existed.
    #[tracing::instrument(skip(self))]
    pub async fn invalidate(&self, file_id: &str) -> Result<bool, AppError> {
        let Some(record) = self.repository.delete(file_id).await? else {
            return Ok(false);
        };
        if let Err(e) = self.storage.delete(&record.storage_key).await {
            tracing::warn!(error = %e, storage_key = %record.storage_key, "Failed to delete upload bytes");
        }
        tracing::info!(file_id = %file_id, "Upload invalidated");
        Ok(true)
    }

    /// Delete every expired record and its bytes. Returns the number of
    /// records removed.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "expire_uploads"))]
    pub async fn purge_expired(&self) -> Result<usize, AppError> {
        let expired = self.repository.list_expired(Utc::now()).await?;
        let mut removed = 0usize;

        for record in expired {
            tracing::info!(
                file_id = %record.file_id,
                storage_key = %record.storage_key,
                expires_at = %record.expires_at,
                "Deleting expired upload"
            );

            if let Err(e) = self.storage.delete(&record.storage_key).await {
                tracing::error!(
                    error = %e,
                    storage_key = %record.storage_key,
                    "Failed to delete file from storage, continuing with record deletion"
                );
            }

            match self.repository.delete(&record.file_id).await {
                Ok(Some(_)) => removed += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(error = %e, file_id = %record.file_id, "Failed to delete upload record")
                }
            }
        }

        Ok(removed)
    }

    pub async fn count(&self) -> Result<usize, AppError> {
        Ok(self.repository.count().await?)
    }
}
