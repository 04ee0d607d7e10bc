//! Retrieval-augmented question answering over the dataset tables.
//!
//! Rows are rendered to text chunks tagged with `{tipo, club, season}`,
//! embedded through an [`Embedder`] and stored in a [`VectorIndex`].
//! Retrieval always filters on those tags, so a summary for one club and
//! season never sees another's rows. Answers come from a [`TextGenerator`]
//! that is told to use the retrieved context only.
//!
//! Every collaborator is a trait; [`memory`] has in-process doubles.

// Native `async fn` in traits, as in `winning-core`.
#![allow(async_fn_in_trait)]

pub mod agent;
pub mod chunk;
pub mod config;
pub mod error;
pub mod index;
mod ingest;
pub mod memory;
mod retrieve;
mod summarize;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use index::{
  Condition, Embedder, IndexPoint, Metadata, MetadataFilter, ScoredChunk, TextGenerator,
  VectorIndex,
};
pub use ingest::IngestReport;

/// Reply given whenever the data holds no answer.
pub const NOT_FOUND_REPLY: &str = "No encuentro esa información en los datos disponibles.";

/// The pipeline: an index, the embedder that fills and queries it, and the
/// generator that writes answers.
pub struct Rag<I, E, G> {
  index:     I,
  embedder:  E,
  generator: G,
  config:    RagConfig,
}

impl<I, E, G> Rag<I, E, G>
where
  I: VectorIndex,
  E: Embedder,
  G: TextGenerator,
{
  pub fn new(index: I, embedder: E, generator: G, config: RagConfig) -> Self {
    Self { index, embedder, generator, config }
  }

  pub fn index(&self) -> &I { &self.index }

  pub fn config(&self) -> &RagConfig { &self.config }

  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    self.embedder.embed(text).await.map_err(Error::embedding)
  }

  async fn generate(&self, system: &str, user: &str) -> Result<String> {
    let reply = self
      .generator
      .generate(system, user)
      .await
      .map_err(Error::generation)?;
    Ok(reply.trim().to_string())
  }
}
