use crate::config::PrepareStep;
use crate::error::PrepareError;

use super::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// Prepare-step registry
// ---------------------------------------------------------------------------
//
// Provider exports sometimes need a touch-up before projection (readings
// exported as "1,234" text, Wh instead of kWh, production counted negative).
// Profiles select these by name; there is deliberately no way to inject
// code through the configuration.

const REGISTERED: &[&str] = &["strip_thousands", "wh_to_kwh", "negate"];

pub fn is_registered(name: &str) -> bool {
    REGISTERED.contains(&name)
}

/// Apply one named step to its target column across all rows, in place.
pub fn apply(dataset: &mut Dataset, step: &PrepareStep) -> Result<(), PrepareError> {
    if !dataset.has_column(&step.column) {
        return Err(PrepareError::ColumnNotFound(step.column.clone()));
    }
    let transform: fn(&Value) -> Result<Value, PrepareError> = match step.transform.as_str() {
        "strip_thousands" => strip_thousands,
        "wh_to_kwh" => |v| numeric(v, |n| n / 1000.0),
        "negate" => |v| numeric(v, |n| -n),
        other => return Err(PrepareError::UnknownTransform(other.to_string())),
    };
    for row in dataset.rows.iter_mut() {
        if let Some(cell) = row.get(&step.column) {
            let replacement = transform(cell)?;
            row.insert(step.column.clone(), replacement);
        }
    }
    Ok(())
}

/// `"1,234.5"` → 1234.5; quotes and thousands separators stripped.
fn strip_thousands(cell: &Value) -> Result<Value, PrepareError> {
    match cell {
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && *c != '"').collect();
            if cleaned.trim().is_empty() {
                return Ok(Value::Null);
            }
            cleaned
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| PrepareError::Parse {
                    what: "numeric cell",
                    raw: s.clone(),
                })
        }
        other => Ok(other.clone()),
    }
}

fn numeric(cell: &Value, f: fn(f64) -> f64) -> Result<Value, PrepareError> {
    match cell {
        Value::Null => Ok(Value::Null),
        Value::Float(v) => Ok(Value::Float(f(*v))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|v| Value::Float(f(v)))
            .map_err(|_| PrepareError::Parse {
                what: "numeric cell",
                raw: s.clone(),
            }),
        Value::Timestamp(_) => Err(PrepareError::Parse {
            what: "numeric cell",
            raw: cell.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;

    fn dataset(cell: Value) -> Dataset {
        let rows = vec![Row::from([
            ("Datum".to_string(), Value::Timestamp(0)),
            ("Energy".to_string(), cell),
        ])];
        Dataset::from_rows(rows, "Datum")
    }

    fn step(transform: &str) -> PrepareStep {
        PrepareStep {
            transform: transform.into(),
            column: "Energy".into(),
        }
    }

    #[test]
    fn strip_thousands_parses_grouped_text() {
        let mut ds = dataset(Value::String("\"12,345.6\"".into()));
        apply(&mut ds, &step("strip_thousands")).unwrap();
        assert_eq!(ds.rows[0]["Energy"], Value::Float(12_345.6));
    }

    #[test]
    fn wh_to_kwh_scales() {
        let mut ds = dataset(Value::Float(2500.0));
        apply(&mut ds, &step("wh_to_kwh")).unwrap();
        assert_eq!(ds.rows[0]["Energy"], Value::Float(2.5));
    }

    #[test]
    fn negate_flips_sign_and_skips_null() {
        let mut ds = dataset(Value::Float(3.0));
        apply(&mut ds, &step("negate")).unwrap();
        assert_eq!(ds.rows[0]["Energy"], Value::Float(-3.0));

        let mut ds = dataset(Value::Null);
        apply(&mut ds, &step("negate")).unwrap();
        assert_eq!(ds.rows[0]["Energy"], Value::Null);
    }

    #[test]
    fn unknown_name_and_missing_column_fail() {
        let mut ds = dataset(Value::Float(1.0));
        assert!(apply(&mut ds, &step("exec")).is_err());
        let missing = PrepareStep {
            transform: "negate".into(),
            column: "Water".into(),
        };
        assert!(apply(&mut ds, &missing).is_err());
    }

    #[test]
    fn non_numeric_text_is_a_parse_error() {
        let mut ds = dataset(Value::String("n/a".into()));
        assert!(apply(&mut ds, &step("wh_to_kwh")).is_err());
    }
}
