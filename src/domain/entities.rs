use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unknown connector type: {0}")]
    UnknownConnector(String),
    #[error("unknown polish type: {0}")]
    UnknownPolish(String),
    #[error("unknown loss grade: {0}")]
    UnknownLossGrade(String),
    #[error("unknown fiber mode: {0}")]
    UnknownFiberMode(String),
    #[error("unknown fiber type: {0}")]
    UnknownFiberType(String),
    #[error("unknown jacket type: {0}")]
    UnknownJacket(String),
    #[error("invalid length: {0}")]
    InvalidLength(String),
}

/// Connector housing fitted at one end of a patch cable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    #[serde(rename = "SC")]
    Sc,
    #[serde(rename = "LC")]
    Lc,
    #[serde(rename = "LC Uniboot")]
    LcUniboot,
    #[serde(
        rename = "LC Uniboot with Push-Pull Tab",
        alias = "LC Uniboot with Push pull Tab"
    )]
    LcUnibootPushPull,
    #[serde(rename = "ST")]
    St,
}

impl ConnectorType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sc => "SC",
            Self::Lc => "LC",
            Self::LcUniboot => "LC Uniboot",
            Self::LcUnibootPushPull => "LC Uniboot with Push-Pull Tab",
            Self::St => "ST",
        }
    }

    /// A Uniboot housing clips two fibers into one billable unit.
    pub const fn is_uniboot(&self) -> bool {
        matches!(self, Self::LcUniboot | Self::LcUnibootPushPull)
    }

    /// Uniboot check on a raw name. Names that do not parse still count
    /// when they mention Uniboot, so new variants bill one housing per end.
    pub fn is_uniboot_name(raw: &str) -> bool {
        match raw.parse::<Self>() {
            Ok(connector) => connector.is_uniboot(),
            Err(_) => raw.to_ascii_lowercase().contains("uniboot"),
        }
    }
}

impl FromStr for ConnectorType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "Push-Pull", "Push pull" and stray double spaces all collapse to one form.
        let normalized = s
            .replace('-', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        match normalized.as_str() {
            "sc" => Ok(Self::Sc),
            "lc" => Ok(Self::Lc),
            "lc uniboot" => Ok(Self::LcUniboot),
            "lc uniboot with push pull tab" => Ok(Self::LcUnibootPushPull),
            "st" => Ok(Self::St),
            _ => Err(ParseError::UnknownConnector(s.to_string())),
        }
    }
}

/// End-face polish. UPC is priced as PC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PolishType {
    #[serde(rename = "PC", alias = "UPC")]
    Pc,
    #[serde(rename = "APC")]
    Apc,
}

impl PolishType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pc => "PC",
            Self::Apc => "APC",
        }
    }
}

impl FromStr for PolishType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PC" | "UPC" => Ok(Self::Pc),
            "APC" => Ok(Self::Apc),
            _ => Err(ParseError::UnknownPolish(s.to_string())),
        }
    }
}

/// Insertion-loss grade used as the connector price bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LossGrade {
    #[default]
    #[serde(rename = "0.2")]
    Standard,
    #[serde(rename = "0.1-0.15")]
    Low,
}

impl LossGrade {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "0.2",
            Self::Low => "0.1-0.15",
        }
    }

    /// Buckets a raw selection value: unset or exactly "0.2" is standard,
    /// anything else ("0.15", "0.1", ...) is the low-loss grade.
    pub fn bucket(raw: &str) -> Self {
        match raw.trim() {
            "" | "0.2" => Self::Standard,
            _ => Self::Low,
        }
    }
}

/// Strict counterpart of [`LossGrade::bucket`]: only the two grade labels parse.
impl FromStr for LossGrade {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0.2" => Ok(Self::Standard),
            "0.1-0.15" => Ok(Self::Low),
            _ => Err(ParseError::UnknownLossGrade(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FiberModeClass {
    #[serde(rename = "SM")]
    Sm,
    #[serde(rename = "MM")]
    Mm,
}

impl FiberModeClass {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sm => "SM",
            Self::Mm => "MM",
        }
    }

    /// "SM" is single-mode, every other non-empty value is multimode.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.eq_ignore_ascii_case("SM") {
            Some(Self::Sm)
        } else {
            Some(Self::Mm)
        }
    }
}

impl FromStr for FiberModeClass {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SM" => Ok(Self::Sm),
            "MM" => Ok(Self::Mm),
            _ => Err(ParseError::UnknownFiberMode(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FiberMode {
    #[serde(rename = "SM")]
    Sm,
    M1,
    M2,
    M3,
    M4,
    M5,
}

impl FiberMode {
    pub const ALL: [FiberMode; 6] = [Self::Sm, Self::M1, Self::M2, Self::M3, Self::M4, Self::M5];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sm => "SM",
            Self::M1 => "M1",
            Self::M2 => "M2",
            Self::M3 => "M3",
            Self::M4 => "M4",
            Self::M5 => "M5",
        }
    }

    pub const fn class(&self) -> FiberModeClass {
        match self {
            Self::Sm => FiberModeClass::Sm,
            _ => FiberModeClass::Mm,
        }
    }
}

impl FromStr for FiberMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SM" => Ok(Self::Sm),
            "M1" => Ok(Self::M1),
            "M2" => Ok(Self::M2),
            "M3" => Ok(Self::M3),
            "M4" => Ok(Self::M4),
            "M5" => Ok(Self::M5),
            _ => Err(ParseError::UnknownFiberMode(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FiberTypeClass {
    Simplex,
    Duplex,
    Round,
}

impl FiberTypeClass {
    pub const ALL: [FiberTypeClass; 3] = [Self::Simplex, Self::Duplex, Self::Round];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Simplex => "Simplex",
            Self::Duplex => "Duplex",
            Self::Round => "Round",
        }
    }

    /// Exact class name first, then the first class name contained in a
    /// descriptive value such as "0.2mm Simplex".
    pub fn resolve(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == raw)
            .or_else(|| Self::ALL.into_iter().find(|class| raw.contains(class.as_str())))
    }

    /// Duplex and round (2F) cables carry two fibers.
    pub const fn is_two_fiber(&self) -> bool {
        matches!(self, Self::Duplex | Self::Round)
    }
}

impl FromStr for FiberTypeClass {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s).ok_or_else(|| ParseError::UnknownFiberType(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JacketType {
    #[serde(rename = "OFNR")]
    Ofnr,
    #[serde(rename = "OFNP")]
    Ofnp,
    #[serde(rename = "LSZH")]
    Lszh,
}

impl JacketType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ofnr => "OFNR",
            Self::Ofnp => "OFNP",
            Self::Lszh => "LSZH",
        }
    }
}

impl FromStr for JacketType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OFNR" => Ok(Self::Ofnr),
            "OFNP" => Ok(Self::Ofnp),
            "LSZH" => Ok(Self::Lszh),
            _ => Err(ParseError::UnknownJacket(s.to_string())),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_str!(
    ConnectorType,
    PolishType,
    LossGrade,
    FiberModeClass,
    FiberMode,
    FiberTypeClass,
    JacketType,
);

/// Which end of the patch cable a connector sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CableEnd {
    A,
    B,
}

impl fmt::Display for CableEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// One pricing request as entered on the form. Every field is a raw
/// string; an empty string means "not selected yet".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Selection {
    pub connector_a: String,
    pub connector_b: String,
    pub polish_a: String,
    pub polish_b: String,
    pub fiber_mode: String,
    pub fiber_type: String,
    #[serde(alias = "lowloss")]
    pub loss_grade: String,
    pub jacket: String,
    pub ship_from: String,
}

impl Selection {
    pub fn connector(&self, end: CableEnd) -> &str {
        match end {
            CableEnd::A => self.connector_a.trim(),
            CableEnd::B => self.connector_b.trim(),
        }
    }

    pub fn polish(&self, end: CableEnd) -> &str {
        match end {
            CableEnd::A => self.polish_a.trim(),
            CableEnd::B => self.polish_b.trim(),
        }
    }

    pub fn fiber_mode_class(&self) -> Option<FiberModeClass> {
        FiberModeClass::from_raw(&self.fiber_mode)
    }

    pub fn fiber_type_class(&self) -> Option<FiberTypeClass> {
        FiberTypeClass::resolve(&self.fiber_type)
    }

    pub fn loss_grade(&self) -> LossGrade {
        LossGrade::bucket(&self.loss_grade)
    }

    /// True when either end carries a Uniboot housing, including spellings
    /// the connector table does not know.
    pub fn has_uniboot(&self) -> bool {
        [CableEnd::A, CableEnd::B]
            .into_iter()
            .any(|end| ConnectorType::is_uniboot_name(self.connector(end)))
    }
}

/// Per-cable cost split, in USD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub connector_material_cost: f64,
    pub labor_cost: f64,
    pub cable_material_cost: f64,
    pub total_cost: f64,
}

/// A standard cable length and its display label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LengthEntry {
    pub meters: f64,
    pub label: Cow<'static, str>,
}

impl LengthEntry {
    pub const fn new(meters: f64, label: &'static str) -> Self {
        Self {
            meters,
            label: Cow::Borrowed(label),
        }
    }

    /// Entry for an arbitrary length, labelled in meters and feet.
    pub fn custom(meters: f64) -> Self {
        const FEET_PER_METER: f64 = 3.28084;
        Self {
            meters,
            label: Cow::Owned(format!("{} m / {:.2} ft", meters, meters * FEET_PER_METER)),
        }
    }
}

/// One line of a generated price list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    pub meters: f64,
    pub label: String,
    pub cable_cost: f64,
    #[serde(rename = "totalPriceUSD")]
    pub total_price_usd: f64,
    pub total_price_local: i64,
    pub resale_price_local: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_names_tolerate_historic_spelling() {
        assert_eq!(
            "LC Uniboot with Push pull Tab".parse::<ConnectorType>(),
            Ok(ConnectorType::LcUnibootPushPull)
        );
        assert_eq!(
            "lc  uniboot with push-pull tab".parse::<ConnectorType>(),
            Ok(ConnectorType::LcUnibootPushPull)
        );
        assert_eq!(" LC ".parse::<ConnectorType>(), Ok(ConnectorType::Lc));
        assert!("FC".parse::<ConnectorType>().is_err());
    }

    #[test]
    fn upc_is_priced_as_pc() {
        assert_eq!("UPC".parse::<PolishType>(), Ok(PolishType::Pc));
        assert_eq!("apc".parse::<PolishType>(), Ok(PolishType::Apc));
        assert!("".parse::<PolishType>().is_err());
    }

    #[test]
    fn loss_grade_buckets() {
        assert_eq!(LossGrade::bucket(""), LossGrade::Standard);
        assert_eq!(LossGrade::bucket("0.2"), LossGrade::Standard);
        assert_eq!(LossGrade::bucket("0.15"), LossGrade::Low);
        assert_eq!(LossGrade::bucket("0.1"), LossGrade::Low);
    }

    #[test]
    fn grade_and_mode_class_labels_parse_back() {
        assert_eq!("0.1-0.15".parse::<LossGrade>(), Ok(LossGrade::Low));
        assert_eq!(
            LossGrade::Standard.to_string().parse::<LossGrade>(),
            Ok(LossGrade::Standard)
        );
        assert_eq!(
            "0.15".parse::<LossGrade>(),
            Err(ParseError::UnknownLossGrade("0.15".into()))
        );
        assert_eq!("mm".parse::<FiberModeClass>(), Ok(FiberModeClass::Mm));
        assert_eq!("SM".parse::<FiberModeClass>(), Ok(FiberModeClass::Sm));
        assert!("M3".parse::<FiberModeClass>().is_err());
    }

    #[test]
    fn uniboot_detection_by_name() {
        assert!(ConnectorType::is_uniboot_name("LC Uniboot"));
        assert!(ConnectorType::is_uniboot_name("lc uniboot with push-pull tab"));
        assert!(ConnectorType::is_uniboot_name("MDC Uniboot"));
        assert!(!ConnectorType::is_uniboot_name("LC"));
        assert!(!ConnectorType::is_uniboot_name(""));
    }

    #[test]
    fn mode_class_derivation() {
        assert_eq!(FiberModeClass::from_raw("SM"), Some(FiberModeClass::Sm));
        assert_eq!(FiberModeClass::from_raw("M3"), Some(FiberModeClass::Mm));
        assert_eq!(FiberModeClass::from_raw("OM4"), Some(FiberModeClass::Mm));
        assert_eq!(FiberModeClass::from_raw("  "), None);
    }

    #[test]
    fn fiber_type_matches_descriptive_values() {
        assert_eq!(FiberTypeClass::resolve("Duplex"), Some(FiberTypeClass::Duplex));
        assert_eq!(
            FiberTypeClass::resolve("0.2mm Simplex"),
            Some(FiberTypeClass::Simplex)
        );
        assert_eq!(
            FiberTypeClass::resolve("0.2mm Round 2F 60um (for Uniboot patch cord)"),
            Some(FiberTypeClass::Round)
        );
        assert_eq!(FiberTypeClass::resolve("Ribbon"), None);
    }

    #[test]
    fn selection_reads_legacy_lowloss_key() {
        let selection: Selection =
            serde_json::from_str(r#"{"connectorA":"LC","lowloss":"0.15"}"#).unwrap();
        assert_eq!(selection.connector_a, "LC");
        assert_eq!(selection.loss_grade(), LossGrade::Low);
        assert!(selection.connector_b.is_empty());
    }

    #[test]
    fn custom_length_label() {
        let entry = LengthEntry::custom(1.5);
        assert_eq!(entry.label, "1.5 m / 4.92 ft");
    }
}
