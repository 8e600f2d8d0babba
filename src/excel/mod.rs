//! Excel sheet ↔ record conversion
//!
//! This module provides bidirectional conversion between record collections
//! and named worksheets of one `.xlsx` workbook:
//! - Export: records → sheet (header row from the first record's keys)
//! - Import: sheet → records (header row is authoritative)

mod canonical;
mod document;
mod exporter;
mod importer;

pub use canonical::{cell_to_value, to_canonical_text, value_to_cell, MAX_CELL_CHARS};
pub use document::{Document, Sheet};
pub use exporter::{write_records, SheetExporter};
pub use importer::{read_records, records_from_sheet, SheetImporter};
