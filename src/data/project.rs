use log::warn;

use crate::config::OutputDefinition;
use crate::error::PrepareError;

use super::filter::filter;
use super::model::{Dataset, Value};
use super::recalc::recalculate;

// ---------------------------------------------------------------------------
// Output projection
// ---------------------------------------------------------------------------

/// One serializable output line: epoch seconds plus the reading.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub date: i64,
    pub value: Value,
}

/// Produce the (date, value) row sequence for one output definition.
///
/// Returns `None` when the definition's value column is not in the dataset:
/// that output is skipped and the remaining ones still run. Otherwise the
/// base dataset is filtered (into an independent copy), recalculated when
/// the definition asks for it, and projected down to the two output columns.
pub fn project(
    dataset: &Dataset,
    def: &OutputDefinition,
) -> Result<Option<Vec<OutputRow>>, PrepareError> {
    if !dataset.has_column(&def.value_column) {
        warn!(
            "skipping {}: column {:?} does not exist",
            def.output_name, def.value_column
        );
        return Ok(None);
    }

    let mut view = filter(dataset, &def.filters)?;
    if def.recalculate {
        view = recalculate(&view, &def.value_column)?;
    }

    let mut out = Vec::with_capacity(view.len());
    for row in &view.rows {
        let date = view
            .date_of(row)
            .ok_or_else(|| PrepareError::ColumnNotFound(view.date_column.clone()))?;
        let value = row.get(&def.value_column).cloned().unwrap_or(Value::Null);
        out.push(OutputRow { date, value });
    }
    Ok(Some(out))
}
