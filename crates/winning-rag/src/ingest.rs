//! Loading a club's tables into the vector index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use winning_core::{Error as CoreError, TableKey, TableKind, store::DatasetStore};

use crate::{
  Error, Rag, Result,
  chunk::{chunks_for, id_prefix, row_index},
  index::{Embedder, IndexPoint, TextGenerator, VectorIndex},
};

/// Outcome of [`Rag::ingest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
  /// Chunks upserted per table kind.
  pub chunks:  BTreeMap<TableKind, usize>,
  /// Stale chunks deleted because their table shrank.
  pub pruned:  usize,
  /// Kinds with no table in the store.
  pub skipped: Vec<TableKind>,
}

impl IngestReport {
  pub fn total(&self) -> usize { self.chunks.values().sum() }
}

impl<I, E, G> Rag<I, E, G>
where
  I: VectorIndex,
  E: Embedder,
  G: TextGenerator,
{
  /// Embed every row of every table of `club`/`season` and upsert it.
  ///
  /// Rows are embedded one at a time and upserted in batches of
  /// `upsert_batch_size`. Chunk ids are positional, so re-ingesting replaces
  /// earlier chunks; ids beyond the new row count are deleted.
  pub async fn ingest<S>(&self, store: &S, club: &str, season: &str) -> Result<IngestReport>
  where
    S: DatasetStore,
  {
    let mut report = IngestReport::default();
    let batch_size = self.config.upsert_batch_size.max(1);

    for kind in TableKind::ALL {
      let key = TableKey::new(club, season, kind)?;
      let Some(table) = store.get(&key).await.map_err(CoreError::upstream)? else {
        tracing::debug!(table = %key, "no table; skipped");
        report.skipped.push(kind);
        continue;
      };

      let chunks = chunks_for(&key, &table);
      let count = chunks.len();
      let mut batch = Vec::with_capacity(batch_size.min(count));
      for chunk in chunks {
        let embedding = self.embed(&chunk.text).await?;
        batch.push(IndexPoint {
          id: chunk.id,
          embedding,
          text: chunk.text,
          metadata: chunk.metadata,
        });
        if batch.len() == batch_size {
          self.index.upsert(&batch).await.map_err(Error::index)?;
          batch.clear();
        }
      }
      if !batch.is_empty() {
        self.index.upsert(&batch).await.map_err(Error::index)?;
      }

      let pruned = self.prune(&key, count).await?;
      tracing::info!(table = %key, chunks = count, pruned, "table ingested");
      report.chunks.insert(kind, count);
      report.pruned += pruned;
    }

    tracing::info!(
      club,
      season,
      chunks = report.total(),
      pruned = report.pruned,
      "ingestion complete"
    );
    Ok(report)
  }

  /// Delete chunks of `key`'s table numbered `count` or above.
  async fn prune(&self, key: &TableKey, count: usize) -> Result<usize> {
    let prefix = id_prefix(key.club(), key.season(), key.kind());
    let stale: Vec<String> = self
      .index
      .list_ids(&prefix)
      .await
      .map_err(Error::index)?
      .into_iter()
      .filter(|id| row_index(id, &prefix).is_some_and(|i| i >= count))
      .collect();
    if !stale.is_empty() {
      self.index.delete(&stale).await.map_err(Error::index)?;
    }
    Ok(stale.len())
  }
}
