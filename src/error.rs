use std::path::PathBuf;
use thiserror::Error;

pub type WbResult<T> = Result<T, WbError>;

#[derive(Error, Debug)]
pub enum WbError {
    #[error("Request failed with HTTP {status}: {body}")]
    Request { status: u16, body: String },

    #[error("Unexpected response shape: missing or invalid '{0}'")]
    ResponseShape(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook is locked by another process, close it and retry: {}", .0.display())]
    DocumentLocked(PathBuf),

    #[error("Workbook not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Sheet '{0}' is empty")]
    EmptySheet(String),

    #[error("Nothing to write: record list is empty")]
    EmptyInput,

    #[error("Record at row {row} has field '{field}' missing from the header row")]
    HeaderMismatch { row: u32, field: String },

    #[error("Field '{field}' at row {row} is {chars} characters long, over the {limit} a cell holds")]
    CellTooLong {
        row: u32,
        field: String,
        chars: usize,
        limit: usize,
    },

    #[error("Invalid sheet name '{0}'")]
    InvalidSheetName(String),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Transport failures. The query string carries the API key, so it never
/// reaches the message.
impl From<reqwest::Error> for WbError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| {
                let mut u = u.clone();
                u.set_query(None);
                u.to_string()
            })
            .unwrap_or_default();
        if err.is_timeout() {
            WbError::Timeout(url)
        } else {
            WbError::Transport(format!("{} ({})", err.without_url(), url))
        }
    }
}
