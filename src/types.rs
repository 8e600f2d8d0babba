use serde_json::{Map, Value};
use std::fmt;

//==============================================================================
// Records
//==============================================================================

/// One catalog item, order or sale: field name → JSON value.
///
/// Key order is insertion order, so the first record of a collection defines
/// the header row when written to a sheet.
pub type Record = Map<String, Value>;

/// Build a record from `(field, value)` pairs, keeping their order.
pub fn record<K, I>(fields: I) -> Record
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

//==============================================================================
// Cells
//==============================================================================

/// Scalar content of one spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

//==============================================================================
// Credentials
//==============================================================================

/// Supplier API credentials: the `Authorization` token and the `key` query
/// parameter. Both are opaque strings.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub key: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            key: key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"***")
            .field("key", &"***")
            .finish()
    }
}
