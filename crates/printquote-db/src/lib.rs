//! Record stores for printquote.
//!
//! Upload metadata lives in an ephemeral keyed store: nothing survives a
//! process restart, which is acceptable because uploads are short-lived.

pub mod db;

pub use db::{InMemoryUploadRepository, RepositoryError, UploadRepository};
