//! Wildberries supplier API
//!
//! Synchronous, one-shot calls: no retries and no pagination.

pub mod client;
pub mod endpoints;

pub use client::{Attachment, ClientConfig, Params, SupplierClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use endpoints::CardsQuery;
