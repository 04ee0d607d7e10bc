//! Retrieval and ingestion tuning.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
  /// Chunks fetched per scoped retrieval.
  pub top_k:             usize,
  /// Chunks fetched by a free-form question.
  pub question_top_k:    usize,
  /// Valuation chunks scanned when looking up a player's current club.
  pub player_top_k:      usize,
  /// Points per `upsert` call during ingestion.
  pub upsert_batch_size: usize,
}

impl Default for RagConfig {
  fn default() -> Self {
    Self {
      top_k:             50,
      question_top_k:    5,
      player_top_k:      10,
      upsert_batch_size: 100,
    }
  }
}
