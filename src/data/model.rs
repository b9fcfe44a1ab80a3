use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what provider exports contain.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Epoch seconds, UTC. Only the date column holds this after assembly.
    Timestamp(i64),
    Float(f64),
    String(String),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Timestamp(t) => write!(f, "{t}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Null => Ok(()),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` where that makes sense.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Timestamp(t) => Some(*t as f64),
            _ => None,
        }
    }

    /// Missing readings: absent cells and NaN floats count the same.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Row / RawTable
// ---------------------------------------------------------------------------

/// One reading row: column name → value.
pub type Row = BTreeMap<String, Value>;

/// A parsed input table before assembly; the date column still holds
/// whatever the loader produced (text or a native spreadsheet datetime).
pub type RawTable = Vec<Row>;

// ---------------------------------------------------------------------------
// Dataset – the assembled table
// ---------------------------------------------------------------------------

/// The full assembled table with a pre-computed column index.
///
/// Invariant (established by `assemble`): rows are sorted ascending by the
/// date column, which holds `Value::Timestamp` for every row.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub rows: Vec<Row>,
    /// Name of the designated date column.
    pub date_column: String,
    /// Sorted union of all column names seen across the rows.
    pub columns: Vec<String>,
}

impl Dataset {
    /// Build the column index from the given rows.
    pub fn from_rows(rows: Vec<Row>, date_column: &str) -> Self {
        let mut column_set: BTreeSet<String> = BTreeSet::new();
        for row in &rows {
            for col in row.keys() {
                column_set.insert(col.clone());
            }
        }
        Dataset {
            rows,
            date_column: date_column.to_string(),
            columns: column_set.into_iter().collect(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Epoch timestamp of a row's date cell, if present and normalized.
    pub fn date_of(&self, row: &Row) -> Option<i64> {
        match row.get(&self.date_column) {
            Some(Value::Timestamp(t)) => Some(*t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn column_index_is_the_union() {
        let rows = vec![
            row(&[("Datum", Value::Timestamp(0)), ("Gas", Value::Float(1.0))]),
            row(&[("Datum", Value::Timestamp(1)), ("Stroom", Value::Float(2.0))]),
        ];
        let ds = Dataset::from_rows(rows, "Datum");
        assert_eq!(ds.columns, vec!["Datum", "Gas", "Stroom"]);
        assert!(ds.has_column("Gas"));
        assert!(!ds.has_column("Water"));
    }

    #[test]
    fn nan_and_null_are_missing() {
        assert!(Value::Null.is_missing());
        assert!(Value::Float(f64::NAN).is_missing());
        assert!(!Value::Float(0.0).is_missing());
        assert!(!Value::String(String::new()).is_missing());
    }

    #[test]
    fn string_form_used_for_filtering() {
        assert_eq!(Value::Timestamp(1577836800).to_string(), "1577836800");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::String("High".into()).to_string(), "High");
        assert_eq!(Value::Null.to_string(), "");
    }
}
