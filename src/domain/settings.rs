use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ORIGIN: &str = "TW";

/// Knobs the calculator reads at call time. Nothing here is global; callers
/// load or build a value and pass it in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Assembly labor in USD per terminated connector, keyed by ship-from origin.
    pub labor_rates: BTreeMap<String, f64>,
    pub default_origin: String,
    /// Local currency (TWD) per USD.
    pub exchange_rate: f64,
    /// Resale multiplier applied to the local-currency amount.
    pub resale_markup: f64,
    /// Refuse to price selections with undefined unit prices.
    pub strict: bool,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            labor_rates: BTreeMap::from([
                (DEFAULT_ORIGIN.to_string(), 0.74),
                ("CN".to_string(), 0.52),
            ]),
            default_origin: DEFAULT_ORIGIN.to_string(),
            exchange_rate: 32.0,
            resale_markup: 1.6,
            strict: false,
        }
    }
}

impl PricingSettings {
    /// Labor rate for a ship-from origin. Unset or unknown origins use the
    /// default origin's rate.
    pub fn labor_rate(&self, ship_from: &str) -> f64 {
        let origin = ship_from.trim().to_ascii_uppercase();
        if !origin.is_empty() {
            if let Some(rate) = self.labor_rates.get(&origin) {
                return *rate;
            }
            tracing::warn!(
                origin = %origin,
                fallback = %self.default_origin,
                "no labor rate for origin, using default origin"
            );
        }
        self.labor_rates
            .get(&self.default_origin)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_labor_rate(&mut self, origin: &str, rate: f64) {
        self.labor_rates
            .insert(origin.trim().to_ascii_uppercase(), rate);
    }
}
