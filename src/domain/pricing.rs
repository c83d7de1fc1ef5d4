//! Patch-cable cost calculation.
//!
//! Every function here is pure: a resident [`PriceSheet`], the caller's
//! [`PricingSettings`] and a [`Selection`] go in, numbers come out. Unset or
//! unpriced attributes contribute zero instead of failing, because the form
//! is priced while it is still being filled in. The `_checked` variants
//! honour [`PricingSettings::strict`] for callers that want a hard stop.

use thiserror::Error;

use super::entities::{
    CableEnd, ConnectorType, CostBreakdown, FiberMode, JacketType, LengthEntry, PolishType,
    PriceRow, Selection,
};
use super::price_table::PriceSheet;
use super::settings::PricingSettings;
use super::validation::{validate, Diagnostic};

/// Billing lengths are whole multiples of this many meters.
pub const BILLING_STEP_METERS: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("undefined price combination: {}", diagnostics.join("; "))]
    UndefinedPrice { diagnostics: Vec<String> },
    #[error("invalid cable length: {0} m")]
    InvalidLength(f64),
}

/// Connector material and labor for one cable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConnectorLaborCost {
    pub connector_material_cost: f64,
    pub labor_cost: f64,
    pub total: f64,
    pub material_count_a: u32,
    pub material_count_b: u32,
    pub labor_count_a: u32,
    pub labor_count_b: u32,
}

impl ConnectorLaborCost {
    pub fn material_connector_count(&self) -> u32 {
        self.material_count_a + self.material_count_b
    }

    pub fn labor_connector_count(&self) -> u32 {
        self.labor_count_a + self.labor_count_b
    }
}

/// Half-up rounding of the scaled value, as used to normalise lengths.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Rounds a money amount to `places` decimals from its exact binary value,
/// the way the amount is printed. Only a value that is exactly halfway
/// rounds away from zero.
pub fn to_fixed(value: f64, places: usize) -> f64 {
    let halves = value * 2_f64.powi(places as i32 + 1);
    if halves.fract() == 0.0 && (halves / 2.0).fract() != 0.0 {
        return round_to(value, places as i32);
    }
    format!("{value:.places$}").parse().unwrap_or(value)
}

/// Length charged for cable material: the actual length normalised to
/// millimetres, then rounded up to the next half meter. Non-positive or
/// non-finite lengths bill as zero.
pub fn billing_length(meters: f64) -> f64 {
    if !meters.is_finite() || meters <= 0.0 {
        return 0.0;
    }

    let normalized = round_to(meters, 3);
    (normalized / BILLING_STEP_METERS).ceil() * BILLING_STEP_METERS
}

/// Duplex and round cables are two-fiber, and a Uniboot on either end forces
/// a two-fiber build even when the fiber type says simplex.
pub fn is_duplex_patch(selection: &Selection) -> bool {
    let two_fiber_type = selection
        .fiber_type_class()
        .map(|class| class.is_two_fiber())
        .unwrap_or(false);
    two_fiber_type || selection.has_uniboot()
}

/// Billable connector housings on one end.
pub fn material_connectors_per_end(connector: &str, duplex: bool) -> u32 {
    if ConnectorType::is_uniboot_name(connector) {
        1
    } else if duplex {
        2
    } else {
        1
    }
}

/// Connectors terminated by hand on one end: one per fiber.
pub fn labor_connectors_per_end(duplex: bool) -> u32 {
    if duplex {
        2
    } else {
        1
    }
}

pub struct Calculator<'a> {
    sheet: &'a PriceSheet,
    settings: &'a PricingSettings,
}

impl<'a> Calculator<'a> {
    pub fn new(sheet: &'a PriceSheet, settings: &'a PricingSettings) -> Self {
        Self { sheet, settings }
    }

    pub fn validate(&self, selection: &Selection) -> Vec<Diagnostic> {
        validate(selection, self.sheet)
    }

    /// Tabulated price of one connector, or 0 when the combination is unset
    /// or has no entry.
    pub fn connector_unit_price(&self, selection: &Selection, end: CableEnd) -> f64 {
        let Ok(connector) = selection.connector(end).parse::<ConnectorType>() else {
            return 0.0;
        };
        let Ok(polish) = selection.polish(end).parse::<PolishType>() else {
            return 0.0;
        };
        let Some(mode) = selection.fiber_mode_class() else {
            return 0.0;
        };
        let grade = selection.loss_grade();

        self.sheet
            .connectors
            .get(connector, grade, mode, polish)
            .unwrap_or_else(|| {
                tracing::debug!(
                    connector = %connector,
                    grade = %grade,
                    mode = %mode,
                    polish = %polish,
                    "no connector price, contributing 0"
                );
                0.0
            })
    }

    /// An end is terminated once its connector, polish and the fiber mode
    /// are all chosen. Unterminated ends contribute no material or labor.
    fn is_terminated(selection: &Selection, end: CableEnd) -> bool {
        !selection.connector(end).is_empty()
            && !selection.polish(end).is_empty()
            && !selection.fiber_mode.trim().is_empty()
    }

    pub fn connector_and_labor(&self, selection: &Selection) -> ConnectorLaborCost {
        let duplex = is_duplex_patch(selection);
        let labor_unit = self.settings.labor_rate(&selection.ship_from);

        let mut cost = ConnectorLaborCost::default();
        for end in [CableEnd::A, CableEnd::B] {
            if !Self::is_terminated(selection, end) {
                continue;
            }

            let material_count = material_connectors_per_end(selection.connector(end), duplex);
            let labor_count = labor_connectors_per_end(duplex);
            let unit_price = self.connector_unit_price(selection, end);

            cost.connector_material_cost += unit_price * material_count as f64;
            match end {
                CableEnd::A => {
                    cost.material_count_a = material_count;
                    cost.labor_count_a = labor_count;
                }
                CableEnd::B => {
                    cost.material_count_b = material_count;
                    cost.labor_count_b = labor_count;
                }
            }
        }

        cost.labor_cost = cost.labor_connector_count() as f64 * labor_unit;
        cost.total = cost.connector_material_cost + cost.labor_cost;
        cost
    }

    /// USD per meter for the selected jacket, fiber type and mode; 0 when
    /// unset or untabulated.
    pub fn cable_price_per_meter(&self, selection: &Selection) -> f64 {
        let Ok(jacket) = selection.jacket.parse::<JacketType>() else {
            return 0.0;
        };
        let Some(fiber_type) = selection.fiber_type_class() else {
            return 0.0;
        };
        let Ok(mode) = selection.fiber_mode.parse::<FiberMode>() else {
            return 0.0;
        };

        self.sheet
            .cables
            .get(jacket, fiber_type, mode)
            .unwrap_or_else(|| {
                tracing::debug!(
                    jacket = %jacket,
                    fiber_type = %fiber_type,
                    mode = %mode,
                    "no cable price, contributing 0"
                );
                0.0
            })
    }

    pub fn cable_cost(&self, meters: f64, selection: &Selection) -> f64 {
        let per_meter = self.cable_price_per_meter(selection);
        if per_meter == 0.0 {
            return 0.0;
        }
        to_fixed(per_meter * billing_length(meters), 4)
    }

    pub fn breakdown(&self, meters: f64, selection: &Selection) -> CostBreakdown {
        let connector = self.connector_and_labor(selection);
        let cable = self.cable_cost(meters, selection);
        CostBreakdown {
            connector_material_cost: connector.connector_material_cost,
            labor_cost: connector.labor_cost,
            cable_material_cost: cable,
            total_cost: to_fixed(connector.total + cable, 2),
        }
    }

    /// Total USD price of one cable, rounded to cents.
    pub fn calculate_price(&self, meters: f64, selection: &Selection) -> f64 {
        self.breakdown(meters, selection).total_cost
    }

    pub fn calculate_price_checked(
        &self,
        meters: f64,
        selection: &Selection,
    ) -> Result<f64, PricingError> {
        if self.settings.strict {
            if !meters.is_finite() || meters <= 0.0 {
                return Err(PricingError::InvalidLength(meters));
            }
            self.ensure_defined(selection)?;
        }
        Ok(self.calculate_price(meters, selection))
    }

    pub fn price_row(&self, entry: &LengthEntry, selection: &Selection) -> PriceRow {
        let total_price_usd = self.calculate_price(entry.meters, selection);
        let local = total_price_usd * self.settings.exchange_rate;
        PriceRow {
            meters: entry.meters,
            label: entry.label.to_string(),
            cable_cost: self.cable_cost(entry.meters, selection),
            total_price_usd,
            total_price_local: local.round() as i64,
            resale_price_local: (local * self.settings.resale_markup).round() as i64,
        }
    }

    /// One row per entry, in the order given.
    pub fn price_list(&self, entries: &[LengthEntry], selection: &Selection) -> Vec<PriceRow> {
        let rows: Vec<PriceRow> = entries
            .iter()
            .map(|entry| self.price_row(entry, selection))
            .collect();
        tracing::debug!(rows = rows.len(), "expanded price list");
        rows
    }

    pub fn price_list_checked(
        &self,
        entries: &[LengthEntry],
        selection: &Selection,
    ) -> Result<Vec<PriceRow>, PricingError> {
        if self.settings.strict {
            self.ensure_defined(selection)?;
            if let Some(entry) = entries
                .iter()
                .find(|entry| !entry.meters.is_finite() || entry.meters <= 0.0)
            {
                return Err(PricingError::InvalidLength(entry.meters));
            }
        }
        Ok(self.price_list(entries, selection))
    }

    fn ensure_defined(&self, selection: &Selection) -> Result<(), PricingError> {
        let diagnostics = self.validate(selection);
        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(PricingError::UndefinedPrice {
                diagnostics: diagnostics.iter().map(ToString::to_string).collect(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn selection() -> Selection {
        Selection {
            connector_a: "LC".into(),
            connector_b: "LC".into(),
            polish_a: "UPC".into(),
            polish_b: "UPC".into(),
            fiber_mode: "SM".into(),
            fiber_type: "Simplex".into(),
            loss_grade: "0.2".into(),
            jacket: "OFNR".into(),
            ship_from: "TW".into(),
        }
    }

    #[test]
    fn billing_length_rounds_up_to_half_meters() {
        assert_eq!(billing_length(1.21), 1.5);
        assert_eq!(billing_length(0.2), 0.5);
        assert_eq!(billing_length(0.5), 0.5);
        assert_eq!(billing_length(3.0), 3.0);
        assert_eq!(billing_length(3.05), 3.5);
        // Float noise below a millimetre does not push onto the next step.
        assert_eq!(billing_length(1.5000001), 1.5);
        assert_eq!(billing_length(1.2099999), 1.5);
    }

    #[test]
    fn billing_length_degenerate_inputs() {
        assert_eq!(billing_length(0.0), 0.0);
        assert_eq!(billing_length(-4.0), 0.0);
        assert_eq!(billing_length(f64::NAN), 0.0);
        assert_eq!(billing_length(f64::INFINITY), 0.0);
    }

    #[test]
    fn billing_length_is_idempotent_and_covers_length() {
        for millis in (1..=5000).step_by(7) {
            let meters = millis as f64 / 1000.0;
            let billed = billing_length(meters);
            assert!(billed >= meters, "{meters} billed as {billed}");
            assert_eq!(billing_length(billed), billed);
        }
    }

    #[test]
    fn to_fixed_uses_the_exact_binary_value() {
        // 3.065 and 4.895 are stored just below the halfway point.
        assert_eq!(to_fixed(3.065, 2), 3.06);
        assert_eq!(to_fixed(4.895, 2), 4.89);
        assert_eq!(to_fixed(1.005, 2), 1.0);
        // Exact halves go up.
        assert_eq!(to_fixed(0.125, 2), 0.13);
        assert_eq!(to_fixed(2.5, 0), 3.0);
        assert_eq!(to_fixed(-0.125, 2), -0.13);
        assert_eq!(to_fixed(1.93499999, 4), 1.935);
        assert!(to_fixed(f64::NAN, 2).is_nan());
    }

    #[test]
    fn half_cent_totals_round_like_printed_prices() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let calculator = Calculator::new(&sheet, &settings);
        // SC has no low-loss price, so only 4 * 0.74 labor plus cable remains.
        let round_sc = Selection {
            connector_a: "SC".into(),
            connector_b: "SC".into(),
            polish_a: "PC".into(),
            polish_b: "PC".into(),
            fiber_type: "Round".into(),
            loss_grade: "0.1-0.15".into(),
            jacket: "OFNP".into(),
            ..selection()
        };
        // 2.96 + 0.21 * 0.5
        assert_eq!(calculator.calculate_price(0.5, &round_sc), 3.06);

        let lszh = Selection {
            jacket: "LSZH".into(),
            ..round_sc
        };
        // 2.96 + 0.09 * 21.5
        assert_eq!(calculator.cable_cost(21.5, &lszh), 1.935);
        assert_eq!(calculator.calculate_price(21.5, &lszh), 4.89);
    }

    #[test]
    fn duplex_detection() {
        let mut s = selection();
        assert!(!is_duplex_patch(&s));
        s.fiber_type = "0.2mm Duplex".into();
        assert!(is_duplex_patch(&s));
        s.fiber_type = "Round".into();
        assert!(is_duplex_patch(&s));
        s.fiber_type = "Simplex".into();
        s.connector_b = "LC Uniboot".into();
        assert!(is_duplex_patch(&s));
    }

    #[test]
    fn simplex_lc_connector_and_labor() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let cost = Calculator::new(&sheet, &settings).connector_and_labor(&selection());
        assert!(close(cost.connector_material_cost, 0.73));
        assert_eq!(cost.labor_connector_count(), 2);
        assert!(close(cost.labor_cost, 1.48));
        assert!(close(cost.total, 2.21));
    }

    #[test]
    fn duplex_lc_counts_two_per_end() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let s = Selection {
            fiber_type: "Duplex".into(),
            ..selection()
        };
        let cost = Calculator::new(&sheet, &settings).connector_and_labor(&s);
        assert_eq!(cost.material_connector_count(), 4);
        assert_eq!(cost.labor_connector_count(), 4);
        assert!(close(cost.connector_material_cost, 0.365 * 4.0));
        assert!(close(cost.labor_cost, 0.74 * 4.0));
    }

    #[test]
    fn uniboot_bills_one_housing_but_two_terminations() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let s = Selection {
            connector_a: "LC Uniboot".into(),
            ..selection()
        };
        let cost = Calculator::new(&sheet, &settings).connector_and_labor(&s);
        assert_eq!(cost.material_count_a, 1);
        assert_eq!(cost.material_count_b, 2);
        assert_eq!(cost.labor_count_a, 2);
        assert_eq!(cost.labor_connector_count(), 4);
        assert!(close(cost.connector_material_cost, 0.716 + 0.365 * 2.0));
    }

    #[test]
    fn ship_from_selects_labor_rate() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let s = Selection {
            ship_from: "CN".into(),
            ..selection()
        };
        let cost = Calculator::new(&sheet, &settings).connector_and_labor(&s);
        assert!(close(cost.labor_cost, 2.0 * 0.52));
    }

    #[test]
    fn unterminated_end_contributes_nothing() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let calculator = Calculator::new(&sheet, &settings);

        let s = Selection {
            connector_b: String::new(),
            ..selection()
        };
        let cost = calculator.connector_and_labor(&s);
        assert!(close(cost.connector_material_cost, 0.365));
        assert_eq!(cost.labor_count_b, 0);
        assert!(close(cost.labor_cost, 0.74));

        let s = Selection {
            fiber_mode: String::new(),
            ..selection()
        };
        assert_eq!(calculator.connector_and_labor(&s), ConnectorLaborCost::default());
    }

    #[test]
    fn unpriced_connector_still_costs_labor() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let s = Selection {
            connector_a: "ST".into(),
            polish_a: "APC".into(),
            ..selection()
        };
        let calculator = Calculator::new(&sheet, &settings);
        assert_eq!(calculator.connector_unit_price(&s, CableEnd::A), 0.0);
        let cost = calculator.connector_and_labor(&s);
        assert!(close(cost.connector_material_cost, 0.365));
        assert_eq!(cost.labor_connector_count(), 2);
    }

    #[test]
    fn cable_cost_uses_billing_length() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let calculator = Calculator::new(&sheet, &settings);
        assert!(close(calculator.cable_cost(1.21, &selection()), 0.09));

        let s = Selection {
            jacket: "OFNP".into(),
            fiber_type: "Duplex".into(),
            fiber_mode: "M3".into(),
            ..selection()
        };
        assert!(close(calculator.cable_cost(3.0, &s), 1.62));
        assert_eq!(calculator.cable_cost(0.0, &s), 0.0);
        assert_eq!(calculator.cable_cost(-1.0, &s), 0.0);
    }

    #[test]
    fn cable_cost_is_zero_for_partial_selection() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let calculator = Calculator::new(&sheet, &settings);
        let s = Selection {
            jacket: String::new(),
            ..selection()
        };
        assert_eq!(calculator.cable_cost(10.0, &s), 0.0);
    }

    #[test]
    fn total_price_is_rounded_to_cents() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let calculator = Calculator::new(&sheet, &settings);
        assert_eq!(calculator.calculate_price(1.21, &selection()), 2.3);
    }

    #[test]
    fn price_row_projects_local_currency() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let calculator = Calculator::new(&sheet, &settings);
        let row = calculator.price_row(&LengthEntry::new(1.21, "1.21 m / 4 ft"), &selection());
        assert_eq!(row.total_price_usd, 2.3);
        // 2.30 USD * 32 = 73.6 TWD, resale 73.6 * 1.6 = 117.76
        assert_eq!(row.total_price_local, 74);
        assert_eq!(row.resale_price_local, 118);
        assert!(close(row.cable_cost, 0.09));
    }

    #[test]
    fn price_list_keeps_entry_order() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let calculator = Calculator::new(&sheet, &settings);
        let entries = [
            LengthEntry::new(10.0, "10 m"),
            LengthEntry::new(1.0, "1 m"),
            LengthEntry::new(5.0, "5 m"),
        ];
        let rows = calculator.price_list(&entries, &selection());
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["10 m", "1 m", "5 m"]);
    }

    #[test]
    fn lenient_checked_matches_unchecked() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings::default();
        let calculator = Calculator::new(&sheet, &settings);
        let s = Selection {
            jacket: "Armored".into(),
            ..selection()
        };
        assert_eq!(
            calculator.calculate_price_checked(1.21, &s),
            Ok(calculator.calculate_price(1.21, &s))
        );
    }

    #[test]
    fn strict_mode_rejects_undefined_prices_and_bad_lengths() {
        let sheet = PriceSheet::builtin();
        let settings = PricingSettings {
            strict: true,
            ..PricingSettings::default()
        };
        let calculator = Calculator::new(&sheet, &settings);

        let s = Selection {
            jacket: "Armored".into(),
            ..selection()
        };
        match calculator.calculate_price_checked(1.21, &s) {
            Err(PricingError::UndefinedPrice { diagnostics }) => assert_eq!(diagnostics.len(), 1),
            other => panic!("expected undefined price, got {other:?}"),
        }

        assert_eq!(
            calculator.calculate_price_checked(0.0, &selection()),
            Err(PricingError::InvalidLength(0.0))
        );
        assert_eq!(calculator.calculate_price_checked(1.21, &selection()), Ok(2.3));

        let entries = [LengthEntry::new(1.0, "1 m"), LengthEntry::new(-1.0, "bad")];
        assert_eq!(
            calculator.price_list_checked(&entries, &selection()),
            Err(PricingError::InvalidLength(-1.0))
        );
    }
}
