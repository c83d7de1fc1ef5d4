//! Cost engine for custom fiber-optic patch cables.
//!
//! [`domain`] holds the pure pricing pipeline (validator, connector and
//! labor costs, billed cable length, price-list expansion). [`infra`] holds
//! what touches the outside world: the price sheet source and CSV export.

pub mod domain;
pub mod infra;
pub mod util;
