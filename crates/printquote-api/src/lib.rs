//! Printquote API Library
//!
//! HTTP handlers, error mapping and application setup for the model-to-quote
//! service.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;

pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use handlers::slice::SliceRequest;
pub use state::AppState;
