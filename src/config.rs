use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::transform;
use crate::error::PrepareError;

// ---------------------------------------------------------------------------
// Provider profile
// ---------------------------------------------------------------------------

/// One row-selection predicate: keep (or drop) rows whose `column` value
/// matches `pattern` as a regular expression (search semantics).
#[derive(Debug, Clone, Deserialize)]
pub struct DataFilter {
    pub column: String,
    pub pattern: String,
    pub inclusive: bool,
}

/// One deliverable file: a named projection of the dataset with its own
/// filter list and recalculation policy.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputDefinition {
    pub output_name: String,
    pub value_column: String,
    #[serde(default)]
    pub filters: Vec<DataFilter>,
    #[serde(default)]
    pub recalculate: bool,
}

/// A named data-preparation step applied to the assembled dataset before
/// any projection. `transform` selects a built-in from the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct PrepareStep {
    pub transform: String,
    pub column: String,
}

/// Sheet selection for spreadsheet inputs: zero-based index or sheet name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

/// The full provider profile. Loaded once per run, immutable afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Input extension without the dot: csv | xlsx | xls | json.
    pub extension: String,
    /// Column holding the reading date.
    pub date_column: String,
    /// strftime-style format of the date column.
    pub date_format: String,
    /// Decimal token used by the provider ('.' or ',').
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
    /// Field delimiter for csv inputs.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Rows to skip before the header row (csv and spreadsheets).
    #[serde(default)]
    pub header_rows: usize,
    /// Trailing rows to drop (csv and spreadsheets).
    #[serde(default)]
    pub footer_rows: usize,
    /// Key chain locating the record array in json inputs.
    #[serde(default)]
    pub record_path: Vec<String>,
    #[serde(default)]
    pub sheet: SheetSelector,
    #[serde(default)]
    pub prepare: Vec<PrepareStep>,
    pub outputs: Vec<OutputDefinition>,
}

fn default_decimal_separator() -> char {
    '.'
}

fn default_delimiter() -> char {
    ','
}

impl Config {
    /// Read and validate a profile from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing profile {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on problems that would otherwise only surface mid-run:
    /// a delimiter the csv reader cannot take, unknown transform names,
    /// and unparsable filter regexes.
    pub fn validate(&self) -> Result<()> {
        // The csv reader takes a single byte.
        if !self.delimiter.is_ascii() {
            anyhow::bail!("delimiter must be an ASCII character, got {:?}", self.delimiter);
        }
        for step in &self.prepare {
            if !transform::is_registered(&step.transform) {
                return Err(PrepareError::UnknownTransform(step.transform.clone()).into());
            }
        }
        for output in &self.outputs {
            for filter in &output.filters {
                regex::Regex::new(&filter.pattern).with_context(|| {
                    format!(
                        "invalid filter pattern {:?} for output {}",
                        filter.pattern, output.output_name
                    )
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"{
        "extension": "xlsx",
        "date_column": "Datum",
        "date_format": "%d-%m-%Y",
        "decimal_separator": ",",
        "header_rows": 1,
        "outputs": [
            {
                "output_name": "gas_high_resolution.csv",
                "value_column": "Meterstand",
                "filters": [
                    { "column": "Type", "pattern": "Gas", "inclusive": true }
                ],
                "recalculate": true
            },
            {
                "output_name": "elec_feed_in_tariff_1_high_resolution.csv",
                "value_column": "Meterstand hoogtarief (El 2)"
            }
        ]
    }"#;

    #[test]
    fn profile_parses_with_defaults() {
        let config: Config = serde_json::from_str(PROFILE).unwrap();
        assert_eq!(config.extension, "xlsx");
        assert_eq!(config.decimal_separator, ',');
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.header_rows, 1);
        assert_eq!(config.footer_rows, 0);
        assert!(matches!(config.sheet, SheetSelector::Index(0)));
        assert_eq!(config.outputs.len(), 2);
        assert!(config.outputs[0].recalculate);
        assert!(!config.outputs[1].recalculate);
        assert!(config.outputs[1].filters.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn sheet_accepts_index_or_name() {
        let by_name: SheetSelector = serde_json::from_str("\"Verbruik\"").unwrap();
        assert!(matches!(by_name, SheetSelector::Name(ref n) if n == "Verbruik"));
        let by_index: SheetSelector = serde_json::from_str("2").unwrap();
        assert!(matches!(by_index, SheetSelector::Index(2)));
    }

    #[test]
    fn unknown_transform_is_rejected() {
        let mut config: Config = serde_json::from_str(PROFILE).unwrap();
        config.prepare.push(PrepareStep {
            transform: "exec".into(),
            column: "Meterstand".into(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let mut config: Config = serde_json::from_str(PROFILE).unwrap();
        config.delimiter = '€';
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_filter_regex_is_rejected() {
        let mut config: Config = serde_json::from_str(PROFILE).unwrap();
        config.outputs[0].filters[0].pattern = "(".into();
        assert!(config.validate().is_err());
    }
}
