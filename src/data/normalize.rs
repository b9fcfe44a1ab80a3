use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::PrepareError;

use super::model::Value;

// ---------------------------------------------------------------------------
// Date normalization
// ---------------------------------------------------------------------------

/// Normalize one date cell to whole epoch seconds.
///
/// Text is parsed with the provider's strftime-style `format`. A format that
/// carries an offset directive is converted to UTC first and the offset is
/// then dropped; a format without one is taken as UTC wall time. Cells that
/// are already a `Timestamp` (native spreadsheet datetimes, or a second
/// normalization pass) come back unchanged.
pub fn normalize(raw: &Value, format: &str) -> Result<i64, PrepareError> {
    match raw {
        Value::Timestamp(t) => Ok(*t),
        Value::String(s) => parse_text(s.trim(), format),
        other => Err(PrepareError::Parse {
            what: "date",
            raw: other.to_string(),
        }),
    }
}

fn parse_text(text: &str, format: &str) -> Result<i64, PrepareError> {
    // Offset-carrying formats parse to a fixed-offset datetime whose
    // timestamp is already the UTC instant.
    if format.contains("%z") || format.contains("%:z") || format.contains("%Z") {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.timestamp());
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
        return Ok(dt.and_utc().timestamp());
    }
    // Date-only formats: midnight UTC.
    if let Ok(d) = NaiveDate::parse_from_str(text, format) {
        return Ok(d.and_time(NaiveTime::MIN).and_utc().timestamp());
    }
    Err(PrepareError::Parse {
        what: "date",
        raw: text.to_string(),
    })
}
