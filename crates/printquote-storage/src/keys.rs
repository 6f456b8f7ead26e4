//! Shared key generation for stored uploads.

use printquote_core::models::ModelExtension;

/// Storage key for an upload: `{file_id}.{extension}`.
pub fn upload_key(file_id: &str, extension: ModelExtension) -> String {
    format!("{}.{}", file_id, extension.as_str())
}
