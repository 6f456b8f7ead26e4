//! Slice pipeline: engine runner behind the queue and the quote assembler
//! in front of it.

mod quote;
mod runner;

pub use quote::{QuoteRequest, QuoteService};
pub use runner::EngineSliceRunner;
