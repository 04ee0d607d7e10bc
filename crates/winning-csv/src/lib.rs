//! CSV codec for dataset tables.
//!
//! Converts between the comma-delimited, UTF-8 (with BOM) files the scrapers
//! produce and [`winning_core::Table`]. Pure synchronous.
//!
//! # Quick start
//!
//! ```no_run
//! let table = winning_csv::parse("player_id,nombre\n1,Juan\n").unwrap();
//! assert_eq!(table.len(), 1);
//! let text = winning_csv::serialize(&table);
//! assert!(text.starts_with('\u{feff}'));
//! ```

pub mod error;
mod parse;
mod serialize;

pub use error::{Error, Result};
use winning_core::Table;

/// Parse a CSV document whose first record is the header row.
///
/// A leading BOM is ignored, blank lines are skipped, and short rows are
/// padded with empty cells. A row with more fields than the header is an
/// error. An empty document is an empty table with no headers.
pub fn parse(input: &str) -> Result<Table> { parse::parse_table(input) }

/// Serialize a table with a leading BOM and `\n` line endings, quoting only
/// the fields that need it.
pub fn serialize(table: &Table) -> String { serialize::serialize_table(table) }
