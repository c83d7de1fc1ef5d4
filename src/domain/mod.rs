//! Patch-cable pricing logic lives here.

pub mod entities;
pub mod length_catalog;
pub mod price_table;
pub mod pricing;
pub mod settings;
pub mod validation;

pub use entities::{
    CableEnd, ConnectorType, CostBreakdown, FiberMode, FiberModeClass, FiberTypeClass, JacketType,
    LengthEntry, LossGrade, ParseError, PolishType, PriceRow, Selection,
};
pub use length_catalog::{parse_lengths, LENGTH_CATALOG};
pub use price_table::{CablePriceTable, ConnectorPriceTable, PriceSheet};
pub use pricing::{
    billing_length, is_duplex_patch, labor_connectors_per_end, material_connectors_per_end,
    round_to, to_fixed, Calculator, ConnectorLaborCost, PricingError, BILLING_STEP_METERS,
};
pub use settings::{PricingSettings, DEFAULT_ORIGIN};
pub use validation::{validate, Diagnostic, DiagnosticSubject};
