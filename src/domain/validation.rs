//! Advisory checks that every selected attribute combination has a price.
//!
//! Validation never blocks a calculation. It reports the combinations the
//! calculators would silently price at zero so the caller can decide
//! whether to stop an export.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entities::{CableEnd, ConnectorType, FiberMode, JacketType, PolishType, Selection};
use super::price_table::PriceSheet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticSubject {
    Connector(CableEnd),
    Cable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub subject: DiagnosticSubject,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Returns one diagnostic per connector end and at most one for the cable.
pub fn validate(selection: &Selection, sheet: &PriceSheet) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for end in [CableEnd::A, CableEnd::B] {
        if let Some(diagnostic) = check_connector(selection, sheet, end) {
            diagnostics.push(diagnostic);
        }
    }

    if let Some(diagnostic) = check_cable(selection, sheet) {
        diagnostics.push(diagnostic);
    }

    diagnostics
}

fn check_connector(selection: &Selection, sheet: &PriceSheet, end: CableEnd) -> Option<Diagnostic> {
    let connector_raw = selection.connector(end);
    if connector_raw.is_empty() {
        return None;
    }

    let polish_raw = selection.polish(end);
    let grade = selection.loss_grade();
    let mode_class = selection.fiber_mode_class();

    let price = connector_raw
        .parse::<ConnectorType>()
        .ok()
        .zip(polish_raw.parse::<PolishType>().ok())
        .zip(mode_class)
        .and_then(|((connector, polish), mode)| sheet.connectors.get(connector, grade, mode, polish));

    if price.is_some() {
        return None;
    }

    Some(Diagnostic {
        subject: DiagnosticSubject::Connector(end),
        message: format!(
            "Connector {end}: no price for {connector_raw} (loss {grade}, mode {}, polish {})",
            mode_class.map(|m| m.as_str()).unwrap_or("unset"),
            or_unset(polish_raw),
        ),
    })
}

fn check_cable(selection: &Selection, sheet: &PriceSheet) -> Option<Diagnostic> {
    let jacket_raw = selection.jacket.trim();
    let type_raw = selection.fiber_type.trim();
    let mode_raw = selection.fiber_mode.trim();
    if jacket_raw.is_empty() || type_raw.is_empty() || mode_raw.is_empty() {
        return None;
    }

    let price = jacket_raw
        .parse::<JacketType>()
        .ok()
        .zip(selection.fiber_type_class())
        .zip(mode_raw.parse::<FiberMode>().ok())
        .and_then(|((jacket, fiber_type), mode)| sheet.cables.get(jacket, fiber_type, mode));

    if price.is_some() {
        return None;
    }

    Some(Diagnostic {
        subject: DiagnosticSubject::Cable,
        message: format!("Cable: no per-meter price for {jacket_raw} / {type_raw} / {mode_raw}"),
    })
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "unset"
    } else {
        value
    }
}
