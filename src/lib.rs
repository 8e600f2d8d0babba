//! wb-export - Wildberries supplier API → Excel
//!
//! This library fetches catalog, order and sales data from the Wildberries
//! supplier API and converts record collections to and from named sheets of
//! an `.xlsx` workbook.
//!
//! # Features
//!
//! - Authenticated GET/POST calls with default `key` parameter and
//!   `Authorization` header merged under call-specific values
//! - Endpoint helpers that unwrap `result` / `data.cards` wrappers
//! - Records → sheet (header row from the first record) and back
//! - Nested values stored as JSON text and parsed on read
//!
//! # Example
//!
//! ```no_run
//! use wb_export::api::{ClientConfig, SupplierClient};
//! use wb_export::excel::{read_records, write_records};
//! use wb_export::types::Credentials;
//!
//! let client = SupplierClient::new(ClientConfig::new(Credentials::new("token", "key")))?;
//! let nomenclature = client.get_catalog_info()?;
//! write_records("test.xlsx", "nomenclature", &nomenclature)?;
//!
//! let back = read_records("test.xlsx", "nomenclature")?;
//! println!("Rows: {}", back.len());
//! # Ok::<(), wb_export::error::WbError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use error::{WbError, WbResult};
pub use types::{Cell, Credentials, Record};
