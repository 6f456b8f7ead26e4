//! Validation helpers shared by the services and the HTTP layer.

use crate::error::AppError;
use crate::models::{MAX_INFILL_DENSITY, MIN_INFILL_DENSITY};

/// Longest accepted file id. Generated ids are well below this.
pub const MAX_FILE_ID_LENGTH: usize = 64;

/// Longest accepted original file name.
pub const MAX_FILE_NAME_LENGTH: usize = 255;

pub fn validate_infill_density(density: i64) -> Result<(), AppError> {
    if density < i64::from(MIN_INFILL_DENSITY) || density > i64::from(MAX_INFILL_DENSITY) {
        return Err(AppError::InvalidInput(format!(
            "infillDensity must be between {} and {}, got {}",
            MIN_INFILL_DENSITY, MAX_INFILL_DENSITY, density
        )));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i64, max_quantity: u32) -> Result<u32, AppError> {
    if quantity < 1 || quantity > i64::from(max_quantity) {
        return Err(AppError::InvalidInput(format!(
            "quantity must be between 1 and {}, got {}",
            max_quantity, quantity
        )));
    }
    Ok(quantity as u32)
}

/// File ids end up in file names, so only `[A-Za-z0-9_-]` is accepted.
pub fn validate_file_id(file_id: &str) -> Result<(), AppError> {
    if file_id.is_empty() {
        return Err(AppError::InvalidInput("fileId is required".to_string()));
    }
    if file_id.len() > MAX_FILE_ID_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "fileId must be at most {} characters",
            MAX_FILE_ID_LENGTH
        )));
    }
    if !file_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::InvalidInput(
            "fileId contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_upload_size(size: u64, max_bytes: u64) -> Result<(), AppError> {
    if size == 0 {
        return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
    }
    if size > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File size {} bytes exceeds the maximum of {} MB",
            size,
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Strip any directory components a client may have sent with the file name.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    base.chars()
        .filter(|c| !c.is_control())
        .take(MAX_FILE_NAME_LENGTH)
        .collect()
}
