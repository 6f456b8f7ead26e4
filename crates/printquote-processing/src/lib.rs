//! Printquote Processing Library
//!
//! Turns a stored model into a price: the slicing engine wrapper, the G-code
//! metrics parser and the pricing engine.

pub mod gcode;
pub mod pricing;
pub mod slicer;

// Re-export commonly used types
pub use gcode::{parse, parse_gcode, FILAMENT_DIAMETER_MM};
pub use pricing::{CostBreakdown, PricingEngine};
pub use slicer::{
    build_args, check_engine, EngineCheck, EngineStatus, ProfileKind, ProfileSet, SliceOutput,
    SlicerError, SlicerInvoker,
};
