use anyhow::Context;
use printquote_core::models::{Material, ParsedGCode, PriceQuote};
use printquote_core::Config;
use printquote_processing::{parse_gcode, PricingEngine};
use std::fmt::Write;

/// Configuration from `lookup`. Invalid values are errors, never defaults.
pub fn load_config<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    Config::from_lookup(lookup).context("Invalid configuration")
}

/// Parse G-code text and price it, attaching parser warnings to the quote.
pub fn quote_gcode(
    text: &str,
    material: Material,
    quantity: u32,
    pricing: &PricingEngine,
    gcode_file_ref: &str,
) -> (ParsedGCode, PriceQuote) {
    let parsed = parse_gcode(text, material.as_str());
    let mut quote = pricing.price(&parsed.metrics, material, quantity, gcode_file_ref);
    quote.warnings = parsed.warning_messages();
    (parsed, quote)
}

/// Human-readable quote summary.
pub fn format_quote(quote: &PriceQuote) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Quote {}", quote.quote_id);
    let _ = writeln!(out, "  G-code:        {}", quote.gcode_file_ref);
    let _ = writeln!(out, "  Weight:        {:.2} g", quote.estimated_weight);
    let _ = writeln!(out, "  Print time:    {:.2} h", quote.print_time);
    let _ = writeln!(out, "  Layers:        {}", quote.layer_count);
    let _ = writeln!(out, "  Material:      {:>12.2} {}", quote.material_cost, quote.currency);
    let _ = writeln!(out, "  Machine:       {:>12.2} {}", quote.machine_cost, quote.currency);
    let _ = writeln!(out, "  Setup fee:     {:>12.2} {}", quote.setup_fee, quote.currency);
    let _ = writeln!(out, "  Item total:    {:>12.2} {}", quote.item_total, quote.currency);
    let _ = writeln!(
        out,
        "  Subtotal (x{}): {:>11.2} {}",
        quote.quantity, quote.subtotal, quote.currency
    );
    for warning in &quote.warnings {
        let _ = writeln!(out, "  warning: {}", warning);
    }
    out
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
