//! Sheet importer implementation - Excel (.xlsx) → records

use super::canonical::cell_to_value;
use super::document::{Document, Sheet};
use crate::error::{WbError, WbResult};
use crate::types::{Cell, Record};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Reads named sheets of one workbook back into record collections.
pub struct SheetImporter {
    path: PathBuf,
}

impl SheetImporter {
    /// Create a new importer for the workbook at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read `sheet_name` as one record per data row.
    pub fn import(&self, sheet_name: &str) -> WbResult<Vec<Record>> {
        let document = Document::open(&self.path)?;
        let sheet = document
            .sheet(sheet_name)
            .ok_or_else(|| WbError::SheetNotFound(sheet_name.to_string()))?;

        let records = records_from_sheet(sheet)?;
        info!(
            path = %self.path.display(),
            sheet = sheet_name,
            rows = records.len(),
            "sheet read"
        );
        Ok(records)
    }
}

/// Read `sheet_name` from the workbook at `path`.
pub fn read_records<P: AsRef<Path>>(path: P, sheet_name: &str) -> WbResult<Vec<Record>> {
    SheetImporter::new(path).import(sheet_name)
}

/// Zip every row after the first with the header row.
pub fn records_from_sheet(sheet: &Sheet) -> WbResult<Vec<Record>> {
    let (header, rows) = sheet
        .rows
        .split_first()
        .ok_or_else(|| WbError::EmptySheet(sheet.name.clone()))?;

    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(col, cell)| header_name(cell, col))
        .collect();

    let records = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(col, name)| {
                    let value = row.get(col).map(cell_to_value).unwrap_or(Value::Null);
                    (name.clone(), value)
                })
                .collect::<Record>()
        })
        .collect();
    Ok(records)
}

fn header_name(cell: &Cell, col: usize) -> String {
    match cell {
        Cell::Empty => format!("col_{}", col + 1),
        Cell::Text(s) if s.is_empty() => format!("col_{}", col + 1),
        other => other.to_string(),
    }
}
