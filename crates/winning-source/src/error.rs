//! Error type for `winning-source`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("GET {url} → {status}")]
  Status { url: String, status: u16 },

  /// The API answered 200 with `success: false` or no history.
  #[error("no market-value history for player {0}")]
  NoHistory(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
