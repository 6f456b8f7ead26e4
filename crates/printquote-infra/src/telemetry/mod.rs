//! Tracing initialization
//!
//! `RUST_LOG` drives the filter; the output format is either the default
//! human-readable layer or one JSON object per line.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry};
