//! CSV export of a JSON index.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::info;

use crate::error::{Error, Result};

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Data rows written, excluding the header.
    pub rows: usize,
    /// CSV file written.
    pub path: PathBuf,
}

/// Default CSV path for a JSON index: the same path with a `.csv` extension.
#[must_use]
pub fn default_csv_path(json_path: &Path) -> PathBuf {
    json_path.with_extension("csv")
}

/// Convert a JSON array of objects into CSV.
///
/// The header is the sorted union of all keys. A row missing a key, or
/// holding `null`, gets an empty cell. Strings are written as-is and any
/// other value as its JSON text.
///
/// # Errors
///
/// Returns [`Error::InvalidIndex`] if the file is not a JSON array of
/// objects, or an I/O or CSV error if reading or writing fails.
pub fn json_to_csv(json_path: &Path, csv_path: Option<&Path>) -> Result<ExportSummary> {
    let text = fs::read_to_string(json_path).map_err(|source| Error::FileRead {
        path: json_path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| Error::invalid_index(json_path, e.to_string()))?;
    let rows = objects(json_path, &value)?;

    let path = csv_path.map_or_else(|| default_csv_path(json_path), Path::to_path_buf);
    let mut writer = csv::Writer::from_path(&path)?;
    write_rows(&mut writer, &rows)?;
    writer.flush()?;

    info!(rows = rows.len(), path = %path.display(), "wrote csv");
    Ok(ExportSummary {
        rows: rows.len(),
        path,
    })
}

fn objects<'a>(path: &Path, value: &'a Value) -> Result<Vec<&'a Map<String, Value>>> {
    let Value::Array(items) = value else {
        return Err(Error::invalid_index(path, "expected a top-level array"));
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object().ok_or_else(|| {
                Error::invalid_index(path, format!("element {index} is not an object"))
            })
        })
        .collect()
}

fn write_rows<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    rows: &[&Map<String, Value>],
) -> Result<()> {
    let header: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    if header.is_empty() {
        return Ok(());
    }

    writer.write_record(&header)?;
    for row in rows {
        writer.write_record(header.iter().map(|key| cell(row.get(*key))))?;
    }
    Ok(())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
