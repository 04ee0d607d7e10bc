//! The collaborator traits and the types that cross them.
//!
//! Implementations live elsewhere: `winning-llm` (embeddings and chat),
//! `winning-store-sqlite` (persistent index) and [`crate::memory`] (tests).

use std::{collections::BTreeMap, future::Future};

use serde::{Deserialize, Serialize};

/// String metadata stored with every chunk.
pub type Metadata = BTreeMap<String, String>;

// ─── Points and results ──────────────────────────────────────────────────────

/// A chunk ready for the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPoint {
  pub id:        String,
  pub embedding: Vec<f32>,
  pub text:      String,
  pub metadata:  Metadata,
}

/// A query hit. Higher `score` is more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
  pub id:       String,
  pub score:    f32,
  pub text:     String,
  pub metadata: Metadata,
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// A condition on one metadata field. Serialises as `{"$eq": v}` or
/// `{"$in": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
  #[serde(rename = "$eq")]
  Eq(String),
  #[serde(rename = "$in")]
  In(Vec<String>),
}

impl Condition {
  pub fn matches(&self, value: Option<&str>) -> bool {
    match (self, value) {
      (Self::Eq(want), Some(v)) => want == v,
      (Self::In(set), Some(v)) => set.iter().any(|w| w == v),
      (_, None) => false,
    }
  }
}

/// Conjunction of per-field conditions. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFilter(BTreeMap<String, Condition>);

impl MetadataFilter {
  pub fn new() -> Self { Self::default() }

  pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
    self.0.insert(field.into(), Condition::Eq(value.into()));
    self
  }

  pub fn is_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<String>,
  {
    let values = values.into_iter().map(Into::into).collect();
    self.0.insert(field.into(), Condition::In(values));
    self
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn conditions(&self) -> impl Iterator<Item = (&str, &Condition)> {
    self.0.iter().map(|(k, c)| (k.as_str(), c))
  }

  pub fn matches(&self, metadata: &Metadata) -> bool {
    self
      .0
      .iter()
      .all(|(field, cond)| cond.matches(metadata.get(field).map(String::as_str)))
  }
}

/// Cosine similarity; `0.0` when either vector is zero or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() || a.is_empty() {
    return 0.0;
  }
  let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
  for (x, y) in a.iter().zip(b) {
    dot += x * y;
    na += x * x;
    nb += y * y;
  }
  if na == 0.0 || nb == 0.0 {
    return 0.0;
  }
  dot / (na.sqrt() * nb.sqrt())
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Turns text into a vector. Every text embedded for one index must go
/// through the same model.
pub trait Embedder: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn embed<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Vec<f32>, Self::Error>> + Send + 'a;
}

/// A vector store with exact-match metadata filtering.
pub trait VectorIndex: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert or replace points by id.
  fn upsert<'a>(
    &'a self,
    points: &'a [IndexPoint],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// The `top_k` points most similar to `embedding` among those matching
  /// `filter`, best first.
  fn query<'a>(
    &'a self,
    embedding: &'a [f32],
    top_k: usize,
    filter: &'a MetadataFilter,
  ) -> impl Future<Output = Result<Vec<ScoredChunk>, Self::Error>> + Send + 'a;

  /// Ids starting with `prefix`, in no particular order.
  fn list_ids<'a>(
    &'a self,
    prefix: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  /// Remove points by id. Unknown ids are ignored.
  fn delete<'a>(
    &'a self,
    ids: &'a [String],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Chat-style text generation with temperature pinned to zero.
pub trait TextGenerator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn generate<'a>(
    &'a self,
    system: &'a str,
    user: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
