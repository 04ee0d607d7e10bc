//! Error type for `winning-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A stored blob is not valid CSV.
  #[error("{path}: {source}")]
  Csv {
    path:   String,
    #[source]
    source: winning_csv::Error,
  },

  /// A stored embedding's byte length is not a multiple of four.
  #[error("chunk {id}: embedding blob of {len} bytes")]
  CorruptEmbedding { id: String, len: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
