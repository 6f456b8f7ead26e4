use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CURRENCY_NGN: &str = "NGN";

/// Round a monetary amount to two decimal places.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A priced slice. Money fields are already rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub quote_id: String,
    /// File name of the engine output this quote was computed from.
    pub gcode_file_ref: String,
    /// Grams of material.
    pub estimated_weight: f64,
    /// Machine time in hours.
    pub print_time: f64,
    pub machine_cost: f64,
    pub material_cost: f64,
    pub setup_fee: f64,
    pub item_total: f64,
    pub quantity: u32,
    pub subtotal: f64,
    pub currency: String,
    pub layer_count: u32,
    /// Parser warnings; empty when the output was complete.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
