//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Embeddings are stored as packed little-endian `f32`; chunk metadata as a
//! compact JSON object.

use winning_rag::{Metadata, ScoredChunk, index::cosine_similarity};

use crate::{Error, Result};

// ─── Embeddings ──────────────────────────────────────────────────────────────

pub fn encode_embedding(v: &[f32]) -> Vec<u8> {
  v.iter().flat_map(|x| x.to_le_bytes()).collect()
}

pub fn decode_embedding(id: &str, bytes: &[u8]) -> Result<Vec<f32>> {
  if bytes.len() % 4 != 0 {
    return Err(Error::CorruptEmbedding { id: id.to_string(), len: bytes.len() });
  }
  Ok(
    bytes
      .chunks_exact(4)
      .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
      .collect(),
  )
}

// ─── Metadata ────────────────────────────────────────────────────────────────

pub fn encode_metadata(m: &Metadata) -> Result<String> { Ok(serde_json::to_string(m)?) }

pub fn decode_metadata(s: &str) -> Result<Metadata> { Ok(serde_json::from_str(s)?) }

// ─── Raw row type ────────────────────────────────────────────────────────────

/// A `chunks` row as read from SQLite, before decoding.
pub struct RawChunk {
  pub id:        String,
  pub text:      String,
  pub metadata:  String,
  pub embedding: Vec<u8>,
}

impl RawChunk {
  /// Decode and score against `query`.
  pub fn into_scored(self, query: &[f32]) -> Result<ScoredChunk> {
    let embedding = decode_embedding(&self.id, &self.embedding)?;
    Ok(ScoredChunk {
      score:    cosine_similarity(query, &embedding),
      metadata: decode_metadata(&self.metadata)?,
      id:       self.id,
      text:     self.text,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedding_bytes_are_little_endian() {
    let bytes = encode_embedding(&[1.0, -0.5]);
    assert_eq!(bytes.len(), 8);
    assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
    assert_eq!(decode_embedding("x", &bytes).unwrap(), [1.0, -0.5]);
  }

  #[test]
  fn truncated_embedding_is_rejected() {
    let err = decode_embedding("x", &[0, 0, 0]).unwrap_err();
    assert!(matches!(err, Error::CorruptEmbedding { len: 3, .. }));
  }
}
