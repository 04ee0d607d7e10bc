//! In-process implementations of the collaborator traits, for tests and for
//! running the pipeline without external services.

use std::{
  collections::{BTreeMap, hash_map::DefaultHasher},
  convert::Infallible,
  hash::{Hash, Hasher},
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use winning_core::normalize::normalize;

use crate::index::{
  Embedder, IndexPoint, MetadataFilter, ScoredChunk, TextGenerator, VectorIndex,
  cosine_similarity,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> { m.lock().unwrap_or_else(PoisonError::into_inner) }

// ─── MemoryIndex ─────────────────────────────────────────────────────────────

/// Brute-force index over a shared map. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryIndex {
  points: Arc<Mutex<BTreeMap<String, IndexPoint>>>,
}

impl MemoryIndex {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { lock(&self.points).len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  pub fn get(&self, id: &str) -> Option<IndexPoint> { lock(&self.points).get(id).cloned() }
}

impl VectorIndex for MemoryIndex {
  type Error = Infallible;

  async fn upsert(&self, points: &[IndexPoint]) -> Result<(), Infallible> {
    let mut map = lock(&self.points);
    for point in points {
      map.insert(point.id.clone(), point.clone());
    }
    Ok(())
  }

  async fn query(
    &self,
    embedding: &[f32],
    top_k: usize,
    filter: &MetadataFilter,
  ) -> Result<Vec<ScoredChunk>, Infallible> {
    let map = lock(&self.points);
    let mut hits: Vec<ScoredChunk> = map
      .values()
      .filter(|p| filter.matches(&p.metadata))
      .map(|p| ScoredChunk {
        id:       p.id.clone(),
        score:    cosine_similarity(embedding, &p.embedding),
        text:     p.text.clone(),
        metadata: p.metadata.clone(),
      })
      .collect();
    // Stable: equal scores keep id order.
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(top_k);
    Ok(hits)
  }

  async fn list_ids(&self, prefix: &str) -> Result<Vec<String>, Infallible> {
    Ok(
      lock(&self.points)
        .keys()
        .filter(|id| id.starts_with(prefix))
        .cloned()
        .collect(),
    )
  }

  async fn delete(&self, ids: &[String]) -> Result<(), Infallible> {
    let mut map = lock(&self.points);
    for id in ids {
      map.remove(id);
    }
    Ok(())
  }
}

// ─── HashEmbedder ────────────────────────────────────────────────────────────

/// Bag-of-words feature hashing over normalised tokens. Texts sharing words
/// score higher; no model involved.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
  dims: usize,
}

impl HashEmbedder {
  pub fn new(dims: usize) -> Self { Self { dims: dims.max(1) } }
}

impl Default for HashEmbedder {
  fn default() -> Self { Self::new(256) }
}

impl Embedder for HashEmbedder {
  type Error = Infallible;

  async fn embed(&self, text: &str) -> Result<Vec<f32>, Infallible> {
    let mut v = vec![0.0f32; self.dims];
    let text = normalize(text);
    for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
      let mut h = DefaultHasher::new();
      token.hash(&mut h);
      v[(h.finish() % self.dims as u64) as usize] += 1.0;
    }
    Ok(v)
  }
}

// ─── CannedGenerator ─────────────────────────────────────────────────────────

/// Returns a fixed reply and records every `(system, user)` prompt pair.
#[derive(Clone, Default)]
pub struct CannedGenerator {
  reply: String,
  calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl CannedGenerator {
  pub fn new(reply: impl Into<String>) -> Self {
    Self { reply: reply.into(), calls: Arc::default() }
  }

  pub fn calls(&self) -> Vec<(String, String)> { lock(&self.calls).clone() }
}

impl TextGenerator for CannedGenerator {
  type Error = Infallible;

  async fn generate(&self, system: &str, user: &str) -> Result<String, Infallible> {
    lock(&self.calls).push((system.to_string(), user.to_string()));
    Ok(self.reply.clone())
  }
}
