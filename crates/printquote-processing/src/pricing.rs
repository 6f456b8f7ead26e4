//! Pricing engine: physical metrics -> monetary quote.

use printquote_core::models::{round_money, GCodeMetrics, Material, PriceQuote, CURRENCY_NGN};
use printquote_core::{generate_quote_id, PricingSettings};

/// Unrounded cost components for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub material_cost: f64,
    pub machine_cost: f64,
    pub setup_fee: f64,
}

impl CostBreakdown {
    pub fn item_total(&self) -> f64 {
        self.material_cost + self.machine_cost + self.setup_fee
    }
}

#[derive(Debug, Clone)]
pub struct PricingEngine {
    settings: PricingSettings,
}

impl PricingEngine {
    pub fn new(settings: PricingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    pub fn breakdown(&self, metrics: &GCodeMetrics, material: Material) -> CostBreakdown {
        CostBreakdown {
            material_cost: metrics.filament_weight_grams * self.settings.material_rate(material),
            machine_cost: metrics.print_time_hours() * self.settings.machine_hourly_rate,
            setup_fee: self.settings.setup_fee,
        }
    }

    /// Price `quantity` copies of the sliced model.
    ///
    /// Components are rounded first and the totals are derived from the
    /// rounded values, so `item_total` is the sum of the presented parts and
    /// `subtotal` is `item_total * quantity`.
    pub fn price(
        &self,
        metrics: &GCodeMetrics,
        material: Material,
        quantity: u32,
        gcode_file_ref: impl Into<String>,
    ) -> PriceQuote {
        let costs = self.breakdown(metrics, material);
        let material_cost = round_money(costs.material_cost);
        let machine_cost = round_money(costs.machine_cost);
        let setup_fee = round_money(costs.setup_fee);
        let item_total = round_money(material_cost + machine_cost + setup_fee);
        let subtotal = round_money(item_total * f64::from(quantity));

        PriceQuote {
            quote_id: generate_quote_id(),
            gcode_file_ref: gcode_file_ref.into(),
            estimated_weight: round_money(metrics.filament_weight_grams),
            print_time: round_money(metrics.print_time_hours()),
            machine_cost,
            material_cost,
            setup_fee,
            item_total,
            quantity,
            subtotal,
            currency: CURRENCY_NGN.to_string(),
            layer_count: metrics.layer_count,
            warnings: Vec::new(),
        }
    }
}
