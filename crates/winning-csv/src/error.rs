//! Error types for the winning-csv codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("line {line}: unterminated quoted field")]
  UnterminatedQuote { line: usize },

  #[error("line {line}: {found} fields, header has {expected}")]
  RaggedRow {
    line:     usize,
    expected: usize,
    found:    usize,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
