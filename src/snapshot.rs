//! Snapshot file I/O.
//!
//! Fetch jobs dump raw records to JSON; reconciliation reads those dumps
//! back, or reads a spreadsheet export where each row carries a notice ID,
//! a solicitation ID and a title column.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::reconcile::{IdentityRule, IdentitySet};
use crate::models::domain::Record;

const CSV_IDENTITY_COLUMNS: [&str; 3] = ["Notice ID", "Solicitation ID", "Solicitation Title"];

/// Load one Identity Set per row of a spreadsheet export.
///
/// Only the recognized identity columns contribute; empty cells and rows
/// with none of those columns filled yield empty (always-unmatched) sets.
pub fn load_csv_identities(path: &Path) -> Result<Vec<IdentitySet>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    // Excel exports prefix the first header with a UTF-8 BOM.
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| CSV_IDENTITY_COLUMNS.contains(&h.as_str()))
        .map(|(i, _)| i)
        .collect();

    let mut sets = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("Failed to read row in {}", path.display()))?;
        let mut ids = IdentitySet::new();
        for &i in &columns {
            if let Some(cell) = row.get(i) {
                if !cell.is_empty() {
                    ids.insert(cell);
                }
            }
        }
        sets.push(ids);
    }

    tracing::info!("Loaded {} rows from {}", sets.len(), path.display());

    Ok(sets)
}

/// Load a JSON dump of records: either a bare array or an envelope with a
/// top-level `results` array.
pub fn load_json_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let json: Value = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let rows = match &json {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(envelope) => envelope
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .context("JSON object has no 'results' array")?,
        _ => anyhow::bail!("Expected a JSON array or envelope in {}", path.display()),
    };

    Ok(rows
        .iter()
        .filter_map(|row| row.as_object().cloned())
        .collect())
}

/// Write fetched records as a pretty-printed JSON array.
pub fn write_json_records(path: &Path, records: &[Record]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());

    Ok(())
}

/// Load a snapshot as Identity Sets, dispatching on the file extension:
/// `.csv` uses the spreadsheet columns, anything else is treated as a JSON
/// dump reduced by `rule`.
pub fn load_snapshot_identities(path: &Path, rule: &IdentityRule) -> Result<Vec<IdentitySet>> {
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        load_csv_identities(path)
    } else {
        let records = load_json_records(path)?;
        Ok(rule.extract_all(&records))
    }
}
