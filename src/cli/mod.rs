//! CLI command handlers

pub mod commands;

pub use commands::{barcodes, card, cards, delete, info, orders, sales, show};
