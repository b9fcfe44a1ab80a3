use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value as JsonValue;

use crate::config::{Config, SheetSelector};
use crate::error::PrepareError;

use super::model::{RawTable, Row, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one export file into a raw table. Dispatch on the *configured*
/// extension — the driver has already checked that every discovered file
/// carries it.
///
/// Supported formats:
/// * `.csv`         – delimited text, configurable delimiter/decimal token
/// * `.xlsx`/`.xls` – spreadsheet, sheet selected by index or name
/// * `.json`        – record array located via the configured key path
pub fn load_file(path: &Path, config: &Config) -> Result<RawTable> {
    match config.extension.as_str() {
        "csv" => load_csv(path, config),
        "xlsx" | "xls" => load_sheet(path, config),
        "json" => load_json(path, config),
        other => Err(PrepareError::UnsupportedFormat(other.to_string()).into()),
    }
}

/// Type a text cell the way the provider meant it: empty → null, numeric
/// (with the provider's decimal token) → float, anything else → text.
/// The date column is exempt — its text goes to the normalizer untouched.
fn guess_cell(text: &str, decimal_separator: char) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    let normalized: String = trimmed
        .chars()
        .map(|c| if c == decimal_separator { '.' } else { c })
        .collect();
    if let Ok(v) = normalized.parse::<f64>() {
        return Value::Float(v);
    }
    Value::String(trimmed.to_string())
}

/// Zip headers with typed cells; unnamed columns are dropped.
fn rows_from_cells(headers: &[String], records: &[Vec<Value>]) -> RawTable {
    records
        .iter()
        .map(|cells| {
            let mut row = Row::new();
            for (header, cell) in headers.iter().zip(cells) {
                if header.is_empty() {
                    continue;
                }
                row.insert(header.clone(), cell.clone());
            }
            row
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, config: &Config) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(config.delimiter as u8)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut lines: Vec<Vec<String>> = Vec::new();
    for (line_no, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("{}: line {}", path.display(), line_no))?;
        lines.push(record.iter().map(|s| s.to_string()).collect());
    }

    // Skip the configured junk rows, take the next as the header row,
    // then drop the trailing footer rows.
    if lines.len() <= config.header_rows {
        bail!("{}: no header row after skipping {}", path.display(), config.header_rows);
    }
    let mut remaining = lines.split_off(config.header_rows);
    let headers: Vec<String> = remaining.remove(0).iter().map(|h| h.trim().to_string()).collect();
    let data_len = remaining.len().saturating_sub(config.footer_rows);
    remaining.truncate(data_len);

    let records: Vec<Vec<Value>> = remaining
        .iter()
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .map(|(header, text)| {
                    if *header == config.date_column {
                        if text.trim().is_empty() {
                            Value::Null
                        } else {
                            Value::String(text.trim().to_string())
                        }
                    } else {
                        guess_cell(text, config.decimal_separator)
                    }
                })
                .collect()
        })
        .collect();

    Ok(rows_from_cells(&headers, &records))
}

// ---------------------------------------------------------------------------
// Spreadsheet loader (.xlsx / .xls)
// ---------------------------------------------------------------------------

fn load_sheet(path: &Path, config: &Config) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = select_sheet(&sheet_names, &config.sheet)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet {sheet_name:?}"))?;

    let rows: Vec<&[Data]> = range.rows().collect();
    sheet_table(&rows, config).with_context(|| path.display().to_string())
}

fn select_sheet(names: &[String], selector: &SheetSelector) -> Result<String, PrepareError> {
    match selector {
        SheetSelector::Index(i) => names
            .get(*i)
            .cloned()
            .ok_or_else(|| PrepareError::BadSheet(format!("index {i}"))),
        SheetSelector::Name(name) => {
            if names.iter().any(|n| n == name) {
                Ok(name.clone())
            } else {
                Err(PrepareError::BadSheet(name.clone()))
            }
        }
    }
}

/// Header/footer skipping and cell typing over the raw cell grid.
fn sheet_table(rows: &[&[Data]], config: &Config) -> Result<RawTable> {
    let mut rows = rows.iter().skip(config.header_rows);
    let headers: Vec<String> = rows
        .next()
        .with_context(|| format!("sheet has no header row after skipping {}", config.header_rows))?
        .iter()
        .map(|cell| match cell {
            Data::String(s) => s.trim().to_string(),
            Data::Empty => String::new(),
            other => format!("{other}"),
        })
        .collect();

    let mut records: Vec<Vec<Value>> = rows
        .map(|cells| {
            headers
                .iter()
                .zip(cells.iter())
                .map(|(header, cell)| sheet_cell(header, cell, config))
                .collect()
        })
        .collect();
    let data_len = records.len().saturating_sub(config.footer_rows);
    records.truncate(data_len);

    Ok(rows_from_cells(&headers, &records))
}

fn sheet_cell(header: &str, cell: &Data, config: &Config) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Float(v) => Value::Float(*v),
        Data::Int(i) => Value::Float(*i as f64),
        Data::Bool(b) => Value::String(b.to_string()),
        // Date-formatted cells are already an instant; keep them as one.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Value::Timestamp(naive.and_utc().timestamp()),
            None => Value::Null,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::String(s) => {
            if header == config.date_column {
                if s.trim().is_empty() {
                    Value::Null
                } else {
                    Value::String(s.trim().to_string())
                }
            } else {
                guess_cell(s, config.decimal_separator)
            }
        }
        Data::Error(_) => Value::Null,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records live in an array reached through `record_path`, e.g.
/// `["energy", "values"]` for `{ "energy": { "values": [ {...}, ... ] } }`.
/// Nested objects inside a record flatten to '.'-joined column names.
fn load_json(path: &Path, config: &Config) -> Result<RawTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let parsed: JsonValue = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut root = &parsed;
    for key in &config.record_path {
        root = root
            .get(key)
            .with_context(|| format!("{}: record path key {key:?} not found", path.display()))?;
    }
    let records = root
        .as_array()
        .with_context(|| format!("{}: record path does not lead to an array", path.display()))?;

    let mut table = RawTable::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .with_context(|| format!("{}: record {i} is not an object", path.display()))?;
        let mut row = Row::new();
        for (key, value) in object {
            flatten_json(key, value, &mut row);
        }
        table.push(row);
    }
    Ok(table)
}

fn flatten_json(prefix: &str, value: &JsonValue, row: &mut Row) {
    match value {
        JsonValue::Object(map) => {
            for (key, nested) in map {
                flatten_json(&format!("{prefix}.{key}"), nested, row);
            }
        }
        JsonValue::Null => {
            row.insert(prefix.to_string(), Value::Null);
        }
        JsonValue::Number(n) => {
            row.insert(prefix.to_string(), Value::Float(n.as_f64().unwrap_or(f64::NAN)));
        }
        JsonValue::String(s) => {
            row.insert(prefix.to_string(), Value::String(s.clone()));
        }
        JsonValue::Bool(b) => {
            row.insert(prefix.to_string(), Value::String(b.to_string()));
        }
        other => {
            row.insert(prefix.to_string(), Value::String(other.to_string()));
        }
    }
}
