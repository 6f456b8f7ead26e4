//! Engine-output cleanup

mod sweeper;

pub use sweeper::{OutputSweeper, SweepReport};
