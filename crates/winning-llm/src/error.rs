//! Error type for `winning-llm`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{endpoint} → {status}: {body}")]
  Status {
    endpoint: &'static str,
    status:   u16,
    body:     String,
  },

  /// The provider answered 2xx but with nothing usable in it.
  #[error("{0}: empty response")]
  EmptyResponse(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
