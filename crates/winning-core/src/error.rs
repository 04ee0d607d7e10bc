//! Error types for `winning-core`.

use thiserror::Error;

use crate::key::TableKey;

/// A boxed backend error, as returned by a [`crate::store::DatasetStore`] or
/// any other collaborator behind a trait.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid table key: {0}")]
  InvalidKey(String),

  #[error("dataset not found: {0}")]
  DatasetNotFound(TableKey),

  /// A squad table needed by a transfer is absent.
  #[error("squad not found: {0}")]
  SquadNotFound(TableKey),

  #[error("{key}: no {expected} column (headers: {headers:?})")]
  SchemaError {
    key:      TableKey,
    expected: &'static str,
    headers:  Vec<String>,
  },

  /// The requested player is not in the origin squad. This is a reported
  /// outcome, not a system fault.
  #[error("player {player:?} not found in {club} {season}")]
  PlayerNotFound {
    player: String,
    club:   String,
    season: String,
  },

  #[error("player {player:?} matches {candidates} rows in {club} {season}")]
  AmbiguousMatch {
    player:     String,
    club:       String,
    season:     String,
    candidates: usize,
  },

  /// A table write failed after `written` had already been persisted. Nothing
  /// is rolled back.
  #[error(
    "write to {failed} failed after {} table(s) were written: {source}",
    .written.len()
  )]
  Persistence {
    written: Vec<TableKey>,
    failed:  TableKey,
    #[source]
    source:  BoxError,
  },

  #[error("upstream unavailable: {0}")]
  UpstreamUnavailable(#[source] BoxError),
}

impl Error {
  /// Wrap a collaborator error as [`Error::UpstreamUnavailable`].
  pub fn upstream<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::UpstreamUnavailable(Box::new(err))
  }

  /// `true` for outcomes that describe the request rather than a fault in
  /// the system (the dataset or player simply isn't there).
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::DatasetNotFound(_)
        | Self::SquadNotFound(_)
        | Self::PlayerNotFound { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
