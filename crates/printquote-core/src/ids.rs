//! Opaque identifiers: millisecond timestamp plus a random alphanumeric suffix.
//!
//! No ordering guarantee is implied by these ids.

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;

const SUFFIX_LEN: usize = 8;

fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}

/// Id for an uploaded model file, e.g. `1718000000000_a8Bz01Qx`.
pub fn generate_file_id() -> String {
    format!("{}_{}", Utc::now().timestamp_millis(), random_suffix())
}

/// Id for a price quote, e.g. `Q-1718000000000-a8Bz01Qx`.
pub fn generate_quote_id() -> String {
    format!("Q-{}-{}", Utc::now().timestamp_millis(), random_suffix())
}

/// File name for an engine output, e.g. `slice_1718000000000_a8Bz01Qx.gcode`.
pub fn generate_output_name() -> String {
    format!(
        "{}{}_{}{}",
        crate::models::OUTPUT_FILE_PREFIX,
        Utc::now().timestamp_millis(),
        random_suffix(),
        crate::models::OUTPUT_FILE_EXTENSION
    )
}
