//! Printquote Core Library
//!
//! This crate provides core domain models, error types, configuration, and validation
//! that are shared across all printquote components.

pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, PricingSettings, SlicerSettings, StorageSettings};
pub use error::{AppError, ErrorMetadata, LogLevel, SliceFailureKind};
pub use ids::{generate_file_id, generate_output_name, generate_quote_id};
