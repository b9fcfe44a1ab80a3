use log::warn;

use crate::error::PrepareError;

use super::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// Monotonic recalculation
// ---------------------------------------------------------------------------

/// Turn a delta-style (or reset-prone) reading column into a cumulative
/// series over the given row sequence.
///
/// Fold in row order: the first row's reading becomes the running total
/// (0.0 when missing); every later row adds its raw reading to the previous
/// total, with a missing reading contributing 0.0 so the row repeats the
/// total it inherited. Each sum is rounded to 3 decimals to bound float
/// drift. The column is non-decreasing afterwards as long as no raw reading
/// was negative; negative deltas pass through unclamped but are logged.
///
/// Works on its own copy, the caller's dataset stays intact.
pub fn recalculate(dataset: &Dataset, value_column: &str) -> Result<Dataset, PrepareError> {
    if !dataset.has_column(value_column) {
        return Err(PrepareError::MissingColumn(value_column.to_string()));
    }
    let mut out = dataset.clone();
    let date_column = out.date_column.clone();
    let mut previous: Option<f64> = None;
    for row in out.rows.iter_mut() {
        let increment = match row.get(value_column) {
            Some(v) if !v.is_missing() => v.as_f64().unwrap_or(0.0),
            _ => 0.0,
        };
        if increment < 0.0 {
            let at = row.get(&date_column).map(|v| v.to_string()).unwrap_or_default();
            warn!("negative reading {increment} in column {value_column:?} at {at}");
        }
        let total = match previous {
            // First row: the reading itself opens the series.
            None => increment,
            Some(prev) => round3(prev + increment),
        };
        row.insert(value_column.to_string(), Value::Float(total));
        previous = Some(total);
    }
    Ok(out)
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
