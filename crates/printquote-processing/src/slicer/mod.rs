//! Slicing engine wrapper.
//!
//! The engine is an opaque external binary. This module resolves the profile
//! files it needs, builds its argument list, runs it under a wall-clock
//! timeout and classifies every way an invocation can fail.

mod args;
mod error;
mod health;
mod invoker;
mod profiles;

pub use args::build_args;
pub use error::SlicerError;
pub use health::{check_engine, EngineCheck, EngineStatus};
pub use invoker::{SliceOutput, SlicerInvoker};
pub use profiles::{ProfileKind, ProfileSet};
