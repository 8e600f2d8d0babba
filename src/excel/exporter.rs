//! Sheet exporter implementation - records → Excel (.xlsx)

use super::canonical::{value_to_cell, MAX_CELL_CHARS};
use super::document::{Document, Sheet};
use crate::error::{WbError, WbResult};
use crate::types::{Cell, Record};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes record collections into named sheets of one workbook.
pub struct SheetExporter {
    path: PathBuf,
}

impl SheetExporter {
    /// Create a new exporter for the workbook at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Replace the contents of `sheet_name` with `records` and save the
    /// workbook. Other sheets are kept; the workbook is created if missing.
    pub fn export(&self, sheet_name: &str, records: &[Record]) -> WbResult<()> {
        let headers = header_row(records)?;

        let mut document = Document::open_or_create(&self.path)?;
        let sheet = document.sheet_mut_or_create(sheet_name);
        sheet.clear();
        fill_sheet(sheet, &headers, records)?;
        document.save()?;

        info!(
            path = %self.path.display(),
            sheet = sheet_name,
            rows = records.len(),
            columns = headers.len(),
            "sheet written"
        );
        Ok(())
    }
}

/// Write `records` to `sheet_name` in the workbook at `path`.
pub fn write_records<P: AsRef<Path>>(path: P, sheet_name: &str, records: &[Record]) -> WbResult<()> {
    SheetExporter::new(path).export(sheet_name, records)
}

/// The first record's keys, in order.
fn header_row(records: &[Record]) -> WbResult<Vec<String>> {
    let first = records.first().ok_or(WbError::EmptyInput)?;
    Ok(first.keys().cloned().collect())
}

/// Headers go in row 1, records from row 2. Values are placed by field name;
/// a field the header does not know fails the write, a missing one stays blank.
///
/// A record with nothing but null or empty fields leaves a blank row, and
/// blank rows at the end of a sheet are not stored by xlsx.
fn fill_sheet(sheet: &mut Sheet, headers: &[String], records: &[Record]) -> WbResult<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet.set(0, col, Cell::Text(header.clone()));
    }

    let columns: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    for (idx, record) in records.iter().enumerate() {
        let row = idx + 1;
        for (field, value) in record {
            let col = *columns
                .get(field.as_str())
                .ok_or_else(|| WbError::HeaderMismatch {
                    row: (row + 1) as u32,
                    field: field.clone(),
                })?;
            let cell = value_to_cell(value)?;
            if let Cell::Text(text) = &cell {
                let chars = text.chars().count();
                if chars > MAX_CELL_CHARS {
                    return Err(WbError::CellTooLong {
                        row: (row + 1) as u32,
                        field: field.clone(),
                        chars,
                        limit: MAX_CELL_CHARS,
                    });
                }
            }
            sheet.set(row, col, cell);
        }
    }
    Ok(())
}
