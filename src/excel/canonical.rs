//! Value ↔ cell conversion
//!
//! A cell only holds scalars, so arrays and objects are stored as JSON text
//! (`["a", "b"]`, `{"k": 1}`) and parsed back when read.

use crate::error::WbResult;
use crate::types::Cell;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Number, Value};
use std::io;

/// Largest integer an xlsx number (f64) holds exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Most characters one xlsx cell holds.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Compact JSON with a space after `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Canonical textual form of a JSON value.
pub fn to_canonical_text(value: &Value) -> WbResult<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Convert a record field into the cell written for it.
///
/// xlsx has no empty text cell, so `""` is written blank like null.
pub fn value_to_cell(value: &Value) -> WbResult<Cell> {
    let cell = match value {
        Value::Null => Cell::Empty,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Int(i)
            } else {
                Cell::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) if s.is_empty() => Cell::Empty,
        Value::String(s) => Cell::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => Cell::Text(to_canonical_text(value)?),
    };
    Ok(cell)
}

/// Convert a cell read from a sheet back into a record field.
pub fn cell_to_value(cell: &Cell) -> Value {
    match cell {
        Cell::Empty => Value::Null,
        Cell::Bool(b) => Value::Bool(*b),
        Cell::Int(i) => Value::from(*i),
        Cell::Float(f) => float_to_value(*f),
        Cell::Text(s) => text_to_value(s),
    }
}

/// xlsx stores every number as a double; whole numbers come back as integers.
fn float_to_value(f: f64) -> Value {
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_INT {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn text_to_value(text: &str) -> Value {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<Value>(text) {
            if parsed.is_array() || parsed.is_object() {
                return parsed;
            }
        }
    }
    Value::String(text.to_string())
}
