//! Printquote Storage Library
//!
//! Byte store for uploaded model files. The only backend is a flat local
//! directory that is shared with the slicing engine's output files.
//!
//! # Storage key format
//!
//! Keys are plain file names inside the store directory: `{file_id}.{extension}`.
//! Keys must not contain path separators or `..`. Key generation is centralized
//! in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::upload_key;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
