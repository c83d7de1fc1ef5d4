//! Delimited-text export of generated price lists.

use std::{
    fs::{self, File},
    io,
    path::Path,
};

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use thiserror::Error;
use time::{macros::format_description, OffsetDateTime};

use crate::domain::PriceRow;

pub const CSV_HEADERS: [&str; 5] = [
    "Length",
    "Cable Cost (USD)",
    "Total (USD)",
    "Total (TWD)",
    "Resale (TWD)",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("malformed price list at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
}

/// A price-list line as read back from an export.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ExportedRow {
    #[serde(rename = "Length")]
    pub label: String,
    #[serde(rename = "Cable Cost (USD)")]
    pub cable_cost: f64,
    #[serde(rename = "Total (USD)")]
    pub total_usd: f64,
    #[serde(rename = "Total (TWD)")]
    pub total_local: i64,
    #[serde(rename = "Resale (TWD)")]
    pub resale_local: i64,
}

/// Writes the header and one record per row. Fields are quoted only when
/// they contain a comma, a quote or a line break.
pub fn write_price_list_csv<W: io::Write>(rows: &[PriceRow], writer: W) -> Result<(), ExportError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    wtr.write_record(CSV_HEADERS)?;
    for row in rows {
        wtr.write_record([
            row.label.clone(),
            format!("{:.3}", row.cable_cost),
            format!("{:.2}", row.total_price_usd),
            row.total_price_local.to_string(),
            row.resale_price_local.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_price_list(rows: &[PriceRow], path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_price_list_csv(rows, File::create(path)?)?;
    tracing::info!(rows = rows.len(), path = %path.display(), "exported price list");
    Ok(())
}

/// Timestamped export name so repeated exports do not overwrite each other.
pub fn default_export_filename(now: OffsetDateTime) -> String {
    let stamp = now
        .format(format_description!("[year][month][day]_[hour][minute]"))
        .unwrap_or_else(|_| now.unix_timestamp().to_string());
    format!("price_list_{stamp}.csv")
}

/// Reads back a price list written by [`write_price_list_csv`].
pub fn parse_price_list_csv<R: io::Read>(reader: R) -> Result<Vec<ExportedRow>, ExportError> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);

    let headers = rdr.headers()?;
    if headers.iter().ne(CSV_HEADERS) {
        return Err(ExportError::Malformed {
            line: 1,
            reason: format!("unexpected header {:?}", headers.iter().collect::<Vec<_>>()),
        });
    }

    let rows = rdr.deserialize().collect::<Result<Vec<ExportedRow>, _>>()?;
    Ok(rows)
}
