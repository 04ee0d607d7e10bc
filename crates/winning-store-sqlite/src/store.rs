//! [`SqliteStore`]: the SQLite implementation of [`DatasetStore`] and
//! [`VectorIndex`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use winning_core::{Table, TableKey, store::DatasetStore};
use winning_rag::{IndexPoint, MetadataFilter, ScoredChunk, VectorIndex};

use crate::{
  Error, Result,
  encode::{RawChunk, encode_embedding, encode_metadata},
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// CSV datasets (the `blobs` table, keyed by [`TableKey::path`]) and the
/// RAG chunk index (the `chunks` table) sharing one SQLite file.
///
/// Clones share the same background connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open the database file at `path`, creating `blobs` and `chunks` if this
  /// is a fresh file.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::with_tables(tokio_rusqlite::Connection::open(path).await?).await
  }

  /// A throwaway database; nothing outlives the returned store.
  pub async fn open_in_memory() -> Result<Self> {
    Self::with_tables(tokio_rusqlite::Connection::open_in_memory().await?).await
  }

  async fn with_tables(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!(version = SCHEMA_VERSION, "dataset store ready");
    Ok(Self { conn })
  }

  /// Paths of every stored dataset under `prefix`, sorted.
  pub async fn list_paths(&self, prefix: &str) -> Result<Vec<String>> {
    let prefix = prefix.to_string();
    let paths = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT path FROM blobs WHERE substr(path, 1, length(?1)) = ?1 ORDER BY path",
        )?;
        let paths = stmt
          .query_map(rusqlite::params![prefix], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(paths)
      })
      .await?;
    Ok(paths)
  }

  /// Number of stored chunks.
  pub async fn chunk_count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))?))
      .await?;
    Ok(usize::try_from(n).unwrap_or(0))
  }
}

// ─── DatasetStore impl ───────────────────────────────────────────────────────

impl DatasetStore for SqliteStore {
  type Error = Error;

  async fn get(&self, key: &TableKey) -> Result<Option<Table>> {
    let path = key.path();
    let query_path = path.clone();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body FROM blobs WHERE path = ?1",
              rusqlite::params![query_path],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    body
      .map(|text| winning_csv::parse(&text).map_err(|source| Error::Csv { path, source }))
      .transpose()
  }

  async fn put(&self, key: &TableKey, table: &Table) -> Result<()> {
    let path = key.path();
    let body = winning_csv::serialize(table);
    let at = Utc::now().to_rfc3339();
    let rows = table.len();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO blobs (path, body, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(path) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
          rusqlite::params![path, body, at],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(table = %key, rows, "blob written");
    Ok(())
  }
}

// ─── VectorIndex impl ────────────────────────────────────────────────────────

impl VectorIndex for SqliteStore {
  type Error = Error;

  async fn upsert(&self, points: &[IndexPoint]) -> Result<()> {
    let rows = points
      .iter()
      .map(|p| {
        Ok((
          p.id.clone(),
          p.text.clone(),
          encode_metadata(&p.metadata)?,
          encode_embedding(&p.embedding),
        ))
      })
      .collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO chunks (id, text, metadata, embedding) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
               text = excluded.text,
               metadata = excluded.metadata,
               embedding = excluded.embedding",
          )?;
          for (id, text, metadata, embedding) in &rows {
            stmt.execute(rusqlite::params![id, text, metadata, embedding])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Brute-force scan: every chunk is decoded, filtered and scored.
  async fn query(
    &self,
    embedding: &[f32],
    top_k: usize,
    filter: &MetadataFilter,
  ) -> Result<Vec<ScoredChunk>> {
    let raws: Vec<RawChunk> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, text, metadata, embedding FROM chunks ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawChunk {
              id:        row.get(0)?,
              text:      row.get(1)?,
              metadata:  row.get(2)?,
              embedding: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut hits = Vec::new();
    for raw in raws {
      let hit = raw.into_scored(embedding)?;
      if filter.matches(&hit.metadata) {
        hits.push(hit);
      }
    }
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(top_k);
    Ok(hits)
  }

  async fn list_ids(&self, prefix: &str) -> Result<Vec<String>> {
    let prefix = prefix.to_string();
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT id FROM chunks WHERE substr(id, 1, length(?1)) = ?1")?;
        let ids = stmt
          .query_map(rusqlite::params![prefix], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn delete(&self, ids: &[String]) -> Result<()> {
    let ids = ids.to_vec();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare("DELETE FROM chunks WHERE id = ?1")?;
          for id in &ids {
            stmt.execute(rusqlite::params![id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
