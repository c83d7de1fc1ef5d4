//! Boundary code: disk cache, remote price sheet, CSV export.

pub mod cache;
pub mod export;
pub mod price_source;
