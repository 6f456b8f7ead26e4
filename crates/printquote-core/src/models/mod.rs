//! Data models for the application
//!
//! Each sub-module covers one stage of the model-to-quote pipeline.

mod job;
mod metrics;
mod quote;
mod slicer;
mod upload;

pub use job::*;
pub use metrics::*;
pub use quote::*;
pub use slicer::*;
pub use upload::*;
