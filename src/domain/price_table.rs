//! Unit-price lookup tables for connectors and cable.
//!
//! Both tables keep the nested shape of the published price sheet so a sheet
//! can be read straight from JSON. A lookup miss is `None`; only the
//! calculators collapse it to a zero contribution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::entities::{
    ConnectorType, FiberMode, FiberModeClass, FiberTypeClass, JacketType, LossGrade, PolishType,
};

type PolishPrices = BTreeMap<PolishType, f64>;
type ModePrices = BTreeMap<FiberModeClass, PolishPrices>;
type GradePrices = BTreeMap<LossGrade, ModePrices>;

/// USD per connector, keyed connector → loss grade → mode class → polish.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectorPriceTable(BTreeMap<ConnectorType, GradePrices>);

impl ConnectorPriceTable {
    pub fn insert(
        &mut self,
        connector: ConnectorType,
        grade: LossGrade,
        mode: FiberModeClass,
        polish: PolishType,
        price: f64,
    ) {
        self.0
            .entry(connector)
            .or_default()
            .entry(grade)
            .or_default()
            .entry(mode)
            .or_default()
            .insert(polish, price);
    }

    pub fn get(
        &self,
        connector: ConnectorType,
        grade: LossGrade,
        mode: FiberModeClass,
        polish: PolishType,
    ) -> Option<f64> {
        self.0
            .get(&connector)?
            .get(&grade)?
            .get(&mode)?
            .get(&polish)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.0
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type ModeMeterPrices = BTreeMap<FiberMode, f64>;

/// USD per meter, keyed jacket → fiber type → fiber mode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CablePriceTable(BTreeMap<JacketType, BTreeMap<FiberTypeClass, ModeMeterPrices>>);

impl CablePriceTable {
    pub fn insert(
        &mut self,
        jacket: JacketType,
        fiber_type: FiberTypeClass,
        mode: FiberMode,
        per_meter: f64,
    ) {
        self.0
            .entry(jacket)
            .or_default()
            .entry(fiber_type)
            .or_default()
            .insert(mode, per_meter);
    }

    pub fn get(&self, jacket: JacketType, fiber_type: FiberTypeClass, mode: FiberMode) -> Option<f64> {
        self.0.get(&jacket)?.get(&fiber_type)?.get(&mode).copied()
    }

    pub fn len(&self) -> usize {
        self.0
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Complete set of unit prices used by one calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceSheet {
    pub connectors: ConnectorPriceTable,
    pub cables: CablePriceTable,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Default for PriceSheet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PriceSheet {
    /// Current production prices (Corning fiber, Taiwan assembly).
    pub fn builtin() -> Self {
        use ConnectorType::*;
        use FiberModeClass::{Mm, Sm};
        use LossGrade::{Low, Standard};
        use PolishType::{Apc, Pc};

        const CONNECTORS: &[(ConnectorType, LossGrade, FiberModeClass, PolishType, f64)] = &[
            (Sc, Standard, Mm, Pc, 0.315),
            (Sc, Standard, Mm, Apc, 0.386),
            (Sc, Standard, Sm, Pc, 0.336),
            (Sc, Standard, Sm, Apc, 0.386),
            (Lc, Standard, Mm, Pc, 0.345),
            (Lc, Standard, Mm, Apc, 0.365),
            (Lc, Standard, Sm, Pc, 0.365),
            (Lc, Standard, Sm, Apc, 0.365),
            (Lc, Low, Mm, Pc, 0.445),
            (Lc, Low, Mm, Apc, 0.465),
            (Lc, Low, Sm, Pc, 0.465),
            (Lc, Low, Sm, Apc, 0.465),
            (LcUniboot, Standard, Mm, Pc, 0.696),
            (LcUniboot, Standard, Mm, Apc, 0.716),
            (LcUniboot, Standard, Sm, Pc, 0.716),
            (LcUniboot, Standard, Sm, Apc, 0.716),
            (LcUniboot, Low, Mm, Pc, 0.896),
            (LcUniboot, Low, Mm, Apc, 0.916),
            (LcUniboot, Low, Sm, Pc, 0.916),
            (LcUniboot, Low, Sm, Apc, 0.916),
            (LcUnibootPushPull, Standard, Mm, Pc, 0.896),
            (LcUnibootPushPull, Standard, Mm, Apc, 0.916),
            (LcUnibootPushPull, Standard, Sm, Pc, 0.916),
            (LcUnibootPushPull, Standard, Sm, Apc, 0.916),
            (LcUnibootPushPull, Low, Mm, Pc, 1.096),
            (LcUnibootPushPull, Low, Mm, Apc, 1.116),
            (LcUnibootPushPull, Low, Sm, Pc, 1.116),
            (LcUnibootPushPull, Low, Sm, Apc, 1.116),
            (St, Standard, Mm, Pc, 0.345),
            (St, Standard, Sm, Pc, 0.365),
        ];

        // Per-meter prices in FiberMode::ALL order: SM, M1..M5.
        const CABLES: &[(JacketType, FiberTypeClass, [f64; 6])] = &[
            (JacketType::Ofnr, FiberTypeClass::Simplex, [0.06, 0.16, 0.09, 0.11, 0.19, 0.56]),
            (JacketType::Ofnr, FiberTypeClass::Duplex, [0.12, 0.32, 0.18, 0.22, 0.38, 1.12]),
            (JacketType::Ofnr, FiberTypeClass::Round, [0.08, 0.28, 0.15, 0.17, 0.32, 1.09]),
            (JacketType::Ofnp, FiberTypeClass::Simplex, [0.22, 0.28, 0.25, 0.27, 0.35, 0.68]),
            (JacketType::Ofnp, FiberTypeClass::Duplex, [0.44, 0.56, 0.5, 0.54, 0.7, 1.36]),
            (JacketType::Ofnp, FiberTypeClass::Round, [0.21, 0.4, 0.27, 0.29, 0.44, 1.21]),
            (JacketType::Lszh, FiberTypeClass::Simplex, [0.06, 0.15, 0.1, 0.12, 0.2, 0.52]),
            (JacketType::Lszh, FiberTypeClass::Duplex, [0.12, 0.3, 0.2, 0.24, 0.4, 1.04]),
            (JacketType::Lszh, FiberTypeClass::Round, [0.09, 0.28, 0.15, 0.17, 0.32, 1.09]),
        ];

        let mut connectors = ConnectorPriceTable::default();
        for &(connector, grade, mode, polish, price) in CONNECTORS {
            connectors.insert(connector, grade, mode, polish, price);
        }

        let mut cables = CablePriceTable::default();
        for &(jacket, fiber_type, prices) in CABLES {
            for (mode, price) in FiberMode::ALL.into_iter().zip(prices) {
                cables.insert(jacket, fiber_type, mode, price);
            }
        }

        Self {
            connectors,
            cables,
            updated_at: None,
        }
    }
}
