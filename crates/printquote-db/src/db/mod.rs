//! Repositories for the data access layer
//
// Upload metadata (file id -> record, with expiry)
pub mod upload;

pub use upload::{InMemoryUploadRepository, RepositoryError, UploadRepository};
