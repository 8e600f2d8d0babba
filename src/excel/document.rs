//! In-memory workbook
//!
//! The whole `.xlsx` file is loaded with calamine, edited as plain cell grids,
//! and written back in full with rust_xlsxwriter. Only values survive a
//! rewrite; formatting is not carried over.

use crate::error::{WbError, WbResult};
use crate::types::Cell;
use calamine::{Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A named grid of cells. Row 0 is the header row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Cell at 0-based `(row, col)`, `Empty` outside the written area.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Store a cell at 0-based `(row, col)`, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if cell.is_empty() && row >= self.rows.len() {
            return;
        }
        if row >= self.rows.len() {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if col >= cells.len() {
            if cell.is_empty() {
                return;
            }
            cells.resize(col + 1, Cell::Empty);
        }
        cells[col] = cell;
    }

    fn from_range(name: String, range: &Range<Data>) -> Self {
        let mut sheet = Sheet::new(name);
        let Some((first_row, first_col)) = range.start() else {
            return sheet;
        };
        for (r, row) in range.rows().enumerate() {
            for (c, data) in row.iter().enumerate() {
                sheet.set(
                    first_row as usize + r,
                    first_col as usize + c,
                    cell_from_data(data),
                );
            }
        }
        sheet
    }
}

/// The spreadsheet document at one path.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    sheets: Vec<Sheet>,
}

impl Document {
    /// Open an existing workbook.
    pub fn open<P: AsRef<Path>>(path: P) -> WbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let sheets = load_sheets(&path)?;
        debug!(path = %path.display(), sheets = sheets.len(), "workbook loaded");
        Ok(Self { path, sheets })
    }

    /// Open a workbook, or start an empty one (no sheets) if the file does
    /// not exist yet.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> WbResult<Self> {
        match Self::open(&path) {
            Err(WbError::DocumentNotFound(path)) => {
                debug!(path = %path.display(), "workbook not found, starting a new one");
                Ok(Self {
                    path,
                    sheets: Vec::new(),
                })
            }
            other => other,
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Sheet lookup. Names compare case-insensitively, as in Excel.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| same_sheet_name(&s.name, name))
    }

    pub fn sheet_mut_or_create(&mut self, name: &str) -> &mut Sheet {
        let idx = match self
            .sheets
            .iter()
            .position(|s| same_sheet_name(&s.name, name))
        {
            Some(idx) => idx,
            None => {
                self.sheets.push(Sheet::new(name));
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[idx]
    }

    /// Rewrite the whole workbook at its path.
    ///
    /// The file is built in memory, written to a temporary file in the same
    /// directory and renamed over the target, so the old workbook stays
    /// intact if anything fails.
    pub fn save(&self) -> WbResult<()> {
        let mut workbook = Workbook::new();
        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&sheet.name)
                .map_err(|_| WbError::InvalidSheetName(sheet.name.clone()))?;
            write_sheet(worksheet, sheet)?;
        }

        let bytes = workbook
            .save_to_buffer()
            .map_err(|e| WbError::Excel(format!("Failed to build Excel file: {}", e)))?;

        persist(&self.path, &bytes)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "workbook saved");
        Ok(())
    }
}

fn same_sheet_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn load_sheets(path: &Path) -> WbResult<Vec<Sheet>> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut workbook: Xlsx<_> = Xlsx::new(BufReader::new(file))
        .map_err(|e| WbError::Excel(format!("Failed to open Excel file: {}", e)))?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| WbError::Excel(format!("Failed to read sheet '{}': {}", sheet_name, e)))?;
        sheets.push(Sheet::from_range(sheet_name, &range));
    }
    Ok(sheets)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => Cell::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> WbResult<()> {
    for (r, cells) in sheet.rows.iter().enumerate() {
        let row = u32::try_from(r)
            .map_err(|_| WbError::Excel(format!("Row {} is out of range", r + 1)))?;
        for (c, cell) in cells.iter().enumerate() {
            let col = u16::try_from(c)
                .map_err(|_| WbError::Excel(format!("Column {} is out of range", c + 1)))?;
            let written = match cell {
                Cell::Empty => continue,
                Cell::Bool(b) => worksheet.write_boolean(row, col, *b),
                Cell::Int(i) => worksheet.write_number(row, col, *i as f64),
                Cell::Float(f) => worksheet.write_number(row, col, *f),
                Cell::Text(s) => worksheet.write_string(row, col, s),
            };
            written.map_err(|e| {
                WbError::Excel(format!(
                    "Failed to write cell ({}, {}) in '{}': {}",
                    r + 1,
                    c + 1,
                    sheet.name,
                    e
                ))
            })?;
        }
    }
    Ok(())
}

fn persist(path: &Path, bytes: &[u8]) -> WbResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| open_error(path, e.error))?;
    Ok(())
}

/// Permission errors are what the OS reports while another program (Excel)
/// holds the file open.
fn open_error(path: &Path, err: io::Error) -> WbError {
    match err.kind() {
        io::ErrorKind::NotFound => WbError::DocumentNotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => WbError::DocumentLocked(path.to_path_buf()),
        _ => WbError::Io(err),
    }
}
