use log::info;

use crate::error::PrepareError;

use super::model::{Dataset, RawTable, Row, Value};
use super::normalize::normalize;

// Sanity bounds against corrupt date parses: [1970-01-01, 2099-12-31] UTC.
const DATE_MIN_EPOCH: i64 = 0;
const DATE_MAX_EPOCH: i64 = 4_102_444_799;

// ---------------------------------------------------------------------------
// Dataset assembly
// ---------------------------------------------------------------------------

/// Concatenate the parsed input tables into one date-sorted dataset.
///
/// The date column is normalized to epoch seconds for every row; rows whose
/// date falls outside [1970-01-01, 2099-12-31] are dropped. A date cell that
/// fails to parse aborts the run — the dataset has to be internally
/// consistent before anything downstream touches it. The sort is stable, so
/// equal-date rows keep their input order. Column sets are unioned and
/// absent cells become `Null`.
pub fn assemble(
    tables: Vec<RawTable>,
    date_column: &str,
    date_format: &str,
) -> Result<Dataset, PrepareError> {
    if tables.is_empty() {
        return Err(PrepareError::EmptyInput);
    }
    let concatenated: Vec<Row> = tables.into_iter().flatten().collect();

    let mut rows: Vec<Row> = Vec::with_capacity(concatenated.len());
    let mut dropped = 0usize;
    for mut row in concatenated {
        let raw = row.get(date_column).cloned().unwrap_or(Value::Null);
        let ts = normalize(&raw, date_format)?;
        if !(DATE_MIN_EPOCH..=DATE_MAX_EPOCH).contains(&ts) {
            dropped += 1;
            continue;
        }
        row.insert(date_column.to_string(), Value::Timestamp(ts));
        rows.push(row);
    }
    if dropped > 0 {
        info!("dropped {dropped} rows with dates outside 1970..=2099");
    }

    rows.sort_by_key(|row| match row.get(date_column) {
        Some(Value::Timestamp(t)) => *t,
        _ => i64::MIN,
    });

    let mut dataset = Dataset::from_rows(rows, date_column);
    let columns = dataset.columns.clone();
    for row in dataset.rows.iter_mut() {
        for col in &columns {
            row.entry(col.clone()).or_insert(Value::Null);
        }
    }
    Ok(dataset)
}
