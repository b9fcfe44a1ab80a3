use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::config::Config;
use crate::data::loader::load_file;
use crate::data::model::{RawTable, Value};
use crate::data::project::{project, OutputRow};
use crate::data::{assemble, transform};
use crate::error::PrepareError;

const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls", "json"];

// ---------------------------------------------------------------------------
// Pipeline driver
// ---------------------------------------------------------------------------

/// One full run: discover → load → assemble → prepare → project → write.
///
/// A pattern that matches nothing is reported and produces no output, but is
/// not treated as a process failure. Everything else that goes wrong before
/// the per-output stage aborts the run; a missing value column only skips
/// its own output.
pub fn run(pattern: &str, config: &Config, out_dir: &Path) -> Result<()> {
    if !SUPPORTED_EXTENSIONS.contains(&config.extension.as_str()) {
        return Err(PrepareError::UnsupportedFormat(config.extension.clone()).into());
    }

    let files = discover(pattern, &config.extension)?;
    if files.is_empty() {
        // Reported, but not a process failure; there is just nothing to do.
        error!("{}", PrepareError::NoFilesFound(pattern.to_string()));
        return Ok(());
    }
    info!("found {} file(s) matching: {}", files.len(), pattern);

    let mut tables: Vec<RawTable> = Vec::with_capacity(files.len());
    for file in &files {
        info!("loading {}", file.display());
        tables.push(load_file(file, config)?);
    }

    info!("assembling dataset");
    let mut dataset = assemble::assemble(tables, &config.date_column, &config.date_format)?;
    if dataset.is_empty() {
        warn!("dataset is empty after assembly, outputs will be empty");
    }
    for step in &config.prepare {
        info!("applying prepare step {} to {:?}", step.transform, step.column);
        transform::apply(&mut dataset, step)?;
    }

    for def in &config.outputs {
        if let Some(rows) = project(&dataset, def)? {
            let path = out_dir.join(&def.output_name);
            info!("creating {}", path.display());
            write_output(&path, &rows)?;
        }
    }
    Ok(())
}

/// Expand the glob pattern and insist every hit carries the configured
/// extension — a mixed directory aborts before any parsing starts.
fn discover(pattern: &str, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob::glob(pattern)
        .with_context(|| format!("invalid file pattern: {pattern}"))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    for file in &files {
        let found = file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if found != extension {
            return Err(PrepareError::MixedExtensions {
                path: file.clone(),
                expected: extension.to_string(),
            }
            .into());
        }
    }
    Ok(files)
}

// ---------------------------------------------------------------------------
// Output serialization
// ---------------------------------------------------------------------------

/// Two comma-separated columns, no header: epoch seconds and the reading
/// with '.' as decimal token. Existing files are overwritten.
fn write_output(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for row in rows {
        writeln!(out, "{},{}", row.date, render_value(&row.value))
            .with_context(|| format!("writing {}", path.display()))?;
    }
    out.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Float(v) if v.is_nan() => String::new(),
        Value::Float(v) => render_decimal(*v),
        Value::Timestamp(t) => t.to_string(),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
    }
}

/// Full shortest-round-trip precision with at least one decimal:
/// `15` → `"15.0"`, `0.12345` → `"0.12345"`. Raw readings pass through
/// untouched; only the accumulator rounds, and it does so before this point.
fn render_decimal(v: f64) -> String {
    let mut s = format!("{v}");
    if v.is_finite() && !s.contains('.') {
        s.push_str(".0");
    }
    s
}
