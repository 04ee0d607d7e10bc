//! Error types for `winning-rag`.

use thiserror::Error;
use winning_core::error::BoxError;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] winning_core::Error),

  #[error("embedding failed: {0}")]
  Embedding(#[source] BoxError),

  #[error("vector index error: {0}")]
  Index(#[source] BoxError),

  #[error("text generation failed: {0}")]
  Generation(#[source] BoxError),
}

impl Error {
  pub fn embedding<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Embedding(Box::new(err))
  }

  pub fn index<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Index(Box::new(err))
  }

  pub fn generation<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Generation(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
