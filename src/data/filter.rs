use regex::Regex;

use crate::config::DataFilter;
use crate::error::PrepareError;

use super::model::{Dataset, Row};

// ---------------------------------------------------------------------------
// Row filtering
// ---------------------------------------------------------------------------

/// Apply an ordered filter list to the dataset and return the surviving rows
/// as a fresh `Dataset` (the base is never touched — each output works on its
/// own copy).
///
/// A row passes one filter when the string form of its cell matches the
/// filter's regex (search semantics, not full-match); `inclusive: false`
/// inverts the test. Filters compose by sequential narrowing, so the result
/// is the logical AND of all of them, with input order preserved. An empty
/// filter list is the identity.
pub fn filter(dataset: &Dataset, filters: &[DataFilter]) -> Result<Dataset, PrepareError> {
    let mut rows: Vec<Row> = dataset.rows.clone();
    for data_filter in filters {
        if !dataset.has_column(&data_filter.column) {
            return Err(PrepareError::ColumnNotFound(data_filter.column.clone()));
        }
        let pattern = Regex::new(&data_filter.pattern).map_err(|_| PrepareError::Parse {
            what: "filter pattern",
            raw: data_filter.pattern.clone(),
        })?;
        rows.retain(|row| {
            let text = row
                .get(&data_filter.column)
                .map(|v| v.to_string())
                .unwrap_or_default();
            pattern.is_match(&text) == data_filter.inclusive
        });
    }
    Ok(Dataset {
        rows,
        date_column: dataset.date_column.clone(),
        columns: dataset.columns.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn include(column: &str, pattern: &str) -> DataFilter {
        DataFilter {
            column: column.into(),
            pattern: pattern.into(),
            inclusive: true,
        }
    }

    fn exclude(column: &str, pattern: &str) -> DataFilter {
        DataFilter {
            inclusive: false,
            ..include(column, pattern)
        }
    }

    fn sample() -> Dataset {
        let rows = ["High", "Low", "High"]
            .iter()
            .enumerate()
            .map(|(i, tariff)| {
                Row::from([
                    ("Datum".to_string(), Value::Timestamp(i as i64 * 86_400)),
                    ("Type".to_string(), Value::String(tariff.to_string())),
                    ("Meterstand".to_string(), Value::Float(i as f64)),
                ])
            })
            .collect();
        Dataset::from_rows(rows, "Datum")
    }

    #[test]
    fn inclusive_filter_keeps_matches_in_order() {
        let ds = sample();
        let out = filter(&ds, &[include("Type", "High")]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.rows[0]["Meterstand"], Value::Float(0.0));
        assert_eq!(out.rows[1]["Meterstand"], Value::Float(2.0));
    }

    #[test]
    fn exclusive_filter_inverts() {
        let ds = sample();
        let out = filter(&ds, &[exclude("Type", "High")]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.rows[0]["Type"], Value::String("Low".into()));
    }

    #[test]
    fn empty_filter_list_is_identity() {
        let ds = sample();
        let out = filter(&ds, &[]).unwrap();
        assert_eq!(out.len(), ds.len());
    }

    #[test]
    fn each_filter_narrows_or_preserves() {
        let ds = sample();
        let filters = vec![include("Type", "H"), include("Meterstand", "2")];
        for n in 1..=filters.len() {
            let wider = filter(&ds, &filters[..n - 1]).unwrap();
            let narrower = filter(&ds, &filters[..n]).unwrap();
            assert!(narrower.len() <= wider.len());
        }
        let out = filter(&ds, &filters).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn search_semantics_not_full_match() {
        let ds = sample();
        // "ig" occurs inside "High"
        let out = filter(&ds, &[include("Type", "ig")]).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn missing_column_is_an_error() {
        let ds = sample();
        let err = filter(&ds, &[include("Tarief", "High")]).unwrap_err();
        assert!(matches!(err, PrepareError::ColumnNotFound(ref c) if c == "Tarief"));
    }

    #[test]
    fn base_dataset_is_untouched() {
        let ds = sample();
        let _ = filter(&ds, &[include("Type", "High")]).unwrap();
        assert_eq!(ds.len(), 3);
    }
}
