//! Printquote Services Library
//!
//! Application services that tie the upload store, the slice queue, the
//! slicing engine and the pricing engine together.

pub mod cleanup;
pub mod slicing;
pub mod upload;

pub use cleanup::CleanupService;
pub use slicing::{EngineSliceRunner, QuoteRequest, QuoteService};
pub use upload::UploadService;
