//! # Return Series Loader
//!
//! Reads a source return table from disk and produces the ordered
//! `ReturnObservation` sequence the analytics engine consumes.
//!
//! Two table shapes are accepted:
//!
//! - the trade-level export (`Timestamp`, `Rebated_ROI`,
//!   `Rebated_Net_Profit`, `Symbol`), one row per closed trade;
//! - a plain period table (`Month`, `Return`), one row per calendar month.
//!
//! Both are validated against their required column set, parsed row by row
//! with row-numbered errors, and sorted chronologically. An empty table is a
//! hard error here, before any statistics run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core_types::ReturnObservation;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

pub mod error;

pub use error::LoaderError;

/// Columns the trade-level table must carry. `Rebated_Net_Profit` is part of
/// the export's contract and is validated, but the engine only consumes the
/// ROI column.
const TRADE_COLUMNS: [&str; 4] = ["Timestamp", "Rebated_ROI", "Rebated_Net_Profit", "Symbol"];

/// Columns the period table must carry.
const PERIOD_COLUMNS: [&str; 2] = ["Month", "Return"];

/// Loads the trade-level return table at `path`.
pub fn load_trade_returns(path: &Path) -> Result<Vec<ReturnObservation>, LoaderError> {
    let file = File::open(path).map_err(|source| LoaderError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let observations = parse_trade_table(file)?;
    info!(
        count = observations.len(),
        path = %path.display(),
        "loaded trade returns"
    );
    Ok(observations)
}

/// Loads the plain monthly period table at `path`.
pub fn load_period_returns(path: &Path) -> Result<Vec<ReturnObservation>, LoaderError> {
    let file = File::open(path).map_err(|source| LoaderError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let observations = parse_period_table(file)?;
    info!(
        count = observations.len(),
        path = %path.display(),
        "loaded period returns"
    );
    Ok(observations)
}

fn parse_trade_table<R: Read>(input: R) -> Result<Vec<ReturnObservation>, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let columns = resolve_columns(reader.headers()?, &TRADE_COLUMNS)?;
    let (timestamp_idx, roi_idx, symbol_idx) = (columns[0], columns[1], columns[3]);

    let mut observations = Vec::new();
    // Row numbers are 1-based and account for the header line.
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let row = row + 2;
        let timestamp = parse_timestamp(&record[timestamp_idx], row)?;
        let value = parse_number(&record[roi_idx], row)?;
        observations.push(ReturnObservation::new(
            timestamp,
            value,
            Some(record[symbol_idx].to_string()),
        ));
    }

    finalize(observations)
}

fn parse_period_table<R: Read>(input: R) -> Result<Vec<ReturnObservation>, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let columns = resolve_columns(reader.headers()?, &PERIOD_COLUMNS)?;
    let (month_idx, return_idx) = (columns[0], columns[1]);

    let mut observations = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let row = row + 2;
        let timestamp = parse_month(&record[month_idx], row)?;
        let value = parse_number(&record[return_idx], row)?;
        observations.push(ReturnObservation::new(timestamp, value, None));
    }

    finalize(observations)
}

/// Maps each required column name to its index, reporting every missing
/// column by name in one error.
fn resolve_columns(
    headers: &csv::StringRecord,
    required: &[&str],
) -> Result<Vec<usize>, LoaderError> {
    let mut indices = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    for name in required {
        match headers.iter().position(|h| h == *name) {
            Some(idx) => indices.push(idx),
            None => missing.push(*name),
        }
    }
    if !missing.is_empty() {
        return Err(LoaderError::MissingColumns(missing.join(", ")));
    }
    Ok(indices)
}

/// Sorts chronologically (stable, so same-timestamp rows keep their input
/// order) and rejects an empty table.
fn finalize(mut observations: Vec<ReturnObservation>) -> Result<Vec<ReturnObservation>, LoaderError> {
    if observations.is_empty() {
        return Err(LoaderError::EmptyTable);
    }
    observations.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    Ok(observations)
}

/// Parses a timestamp in RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC), or
/// bare `YYYY-MM-DD` form.
fn parse_timestamp(value: &str, row: usize) -> Result<DateTime<Utc>, LoaderError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(LoaderError::InvalidTimestamp {
        row,
        value: value.to_string(),
    })
}

/// Parses a `YYYY-MM` month label as the first instant of that month (UTC).
fn parse_month(value: &str, row: usize) -> Result<DateTime<Utc>, LoaderError> {
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| LoaderError::InvalidTimestamp {
            row,
            value: value.to_string(),
        })
}

fn parse_number(value: &str, row: usize) -> Result<f64, LoaderError> {
    value.parse::<f64>().map_err(|_| LoaderError::InvalidNumber {
        row,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TRADE_CSV: &str = "\
Timestamp,Rebated_ROI,Rebated_Net_Profit,Symbol
2025-03-02T09:30:00Z,-0.004,-12.4,ETHUSDT
2025-03-01T10:00:00Z,0.012,34.1,BTCUSDT
2025-03-02 14:05:00,0.007,21.0,BTCUSDT
";

    #[test]
    fn trade_table_is_parsed_and_sorted() {
        let observations = parse_trade_table(Cursor::new(TRADE_CSV)).unwrap();
        assert_eq!(observations.len(), 3);
        assert!(
            observations
                .windows(2)
                .all(|w| w[0].timestamp <= w[1].timestamp)
        );
        assert_eq!(observations[0].label.as_deref(), Some("BTCUSDT"));
        assert!((observations[0].value - 0.012).abs() < 1e-12);
    }

    #[test]
    fn missing_columns_are_reported_by_name() {
        let csv = "Timestamp,Symbol\n2025-03-01T10:00:00Z,BTCUSDT\n";
        let err = parse_trade_table(Cursor::new(csv)).unwrap_err();
        match err {
            LoaderError::MissingColumns(names) => {
                assert_eq!(names, "Rebated_ROI, Rebated_Net_Profit");
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        let csv = "Timestamp,Rebated_ROI,Rebated_Net_Profit,Symbol\n";
        let err = parse_trade_table(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, LoaderError::EmptyTable));
    }

    #[test]
    fn bad_timestamp_names_the_row() {
        let csv = "\
Timestamp,Rebated_ROI,Rebated_Net_Profit,Symbol
2025-03-01T10:00:00Z,0.01,1.0,BTCUSDT
not-a-date,0.02,2.0,BTCUSDT
";
        let err = parse_trade_table(Cursor::new(csv)).unwrap_err();
        match err {
            LoaderError::InvalidTimestamp { row, value } => {
                assert_eq!(row, 3);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("expected InvalidTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn period_table_maps_months_to_first_instants() {
        let csv = "Month,Return\n2025-01,0.02\n2025-02,-0.01\n";
        let observations = parse_period_table(Cursor::new(csv)).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(
            observations[0].timestamp,
            "2025-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(observations[0].label, None);
        assert!((observations[1].value + 0.01).abs() < 1e-12);
    }
}
