use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between discovery and serialization.
///
/// `MissingColumn` is the one non-fatal case: the driver catches it per
/// output definition and keeps going. The rest abort the run.
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("unsupported input extension: .{0}")]
    UnsupportedFormat(String),

    #[error("no files found matching: {0}")]
    NoFilesFound(String),

    #[error("{}: expected a .{expected} file", .path.display())]
    MixedExtensions { path: PathBuf, expected: String },

    #[error("could not parse {what}: {raw}")]
    Parse { what: &'static str, raw: String },

    #[error("filter column does not exist: {0}")]
    ColumnNotFound(String),

    #[error("value column does not exist: {0}")]
    MissingColumn(String),

    #[error("no input tables to assemble")]
    EmptyInput,

    #[error("unknown prepare transform: {0}")]
    UnknownTransform(String),

    #[error("sheet not found in workbook: {0}")]
    BadSheet(String),
}
