use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use printquote_core::models::UploadResponse;
use printquote_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Multipart field carrying the model file.
const FILE_FIELD: &str = "file";

/// Pull the single `file` field out of a multipart body.
async fn read_model_field(mut multipart: Multipart) -> Result<(bytes::Bytes, String), HttpAppError> {
    let mut file: Option<(bytes::Bytes, String)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if file.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            )
            .into());
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("File name is required".to_string()))?;
        let data = field.bytes().await?;
        file = Some((data, file_name));
    }

    file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()).into())
}

/// Upload a 3D model for slicing.
#[utoipa::path(
    post,
    path = "/api/v0/uploads",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Model stored", body = UploadResponse),
        (status = 400, description = "Invalid input or unsupported file type", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_model"))]
pub async fn upload_model(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let (data, file_name) = read_model_field(multipart).await?;
    let record = state.uploads.put(data, &file_name).await?;
    Ok(Json(record.into()))
}

/// Look up an upload's metadata.
#[utoipa::path(
    get,
    path = "/api/v0/uploads/{file_id}",
    tag = "uploads",
    params(("file_id" = String, Path, description = "Upload id returned by the upload endpoint")),
    responses(
        (status = 200, description = "Upload found", body = UploadResponse),
        (status = 404, description = "Unknown upload", body = ErrorResponse),
        (status = 410, description = "Upload expired", body = ErrorResponse)
    )
)]
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let record = state.uploads.get(&file_id).await?;
    Ok(Json(record.into()))
}
