use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::AppError;

/// Accepted 3D-model container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ModelExtension {
    #[serde(rename = "stl")]
    Stl,
    #[serde(rename = "obj")]
    Obj,
    #[serde(rename = "3mf")]
    ThreeMf,
    #[serde(rename = "fbx")]
    Fbx,
    #[serde(rename = "gltf")]
    Gltf,
    #[serde(rename = "glb")]
    Glb,
}

impl ModelExtension {
    pub const ALL: [ModelExtension; 6] = [
        ModelExtension::Stl,
        ModelExtension::Obj,
        ModelExtension::ThreeMf,
        ModelExtension::Fbx,
        ModelExtension::Gltf,
        ModelExtension::Glb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelExtension::Stl => "stl",
            ModelExtension::Obj => "obj",
            ModelExtension::ThreeMf => "3mf",
            ModelExtension::Fbx => "fbx",
            ModelExtension::Gltf => "gltf",
            ModelExtension::Glb => "glb",
        }
    }

    /// Comma separated allow-list, used in error messages.
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|e| format!(".{}", e.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolve the extension of an uploaded file name (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, AppError> {
        let extension = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => "",
        };
        extension.parse()
    }
}

impl fmt::Display for ModelExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelExtension {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('.').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == normalized)
            .ok_or_else(|| {
                AppError::UnsupportedFileType(format!(
                    "Invalid file extension. Allowed extensions: {}",
                    Self::allowed_list()
                ))
            })
    }
}

/// Metadata for a stored, short-lived model upload.
///
/// `file_path` always refers to `file_size_bytes` bytes on disk until the
/// record expires or is invalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub file_id: String,
    /// Key of the bytes inside the byte store.
    pub storage_key: String,
    pub file_path: PathBuf,
    pub file_name: String,
    pub file_size_bytes: u64,
    pub file_extension: ModelExtension,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UploadRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Upload response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_extension: ModelExtension,
    pub expires_at: DateTime<Utc>,
}

impl From<UploadRecord> for UploadResponse {
    fn from(record: UploadRecord) -> Self {
        Self {
            file_id: record.file_id,
            file_name: record.file_name,
            file_size: record.file_size_bytes,
            file_extension: record.file_extension,
            expires_at: record.expires_at,
        }
    }
}
