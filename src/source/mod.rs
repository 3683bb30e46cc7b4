//! Spreadsheet export loading.
//!
//! This module fetches the CSV export (or reads a local copy) and
//! parses it into a record table.

pub mod loader;

pub use loader::{load, parse_csv, DataSource, Fetcher};
