//! Filtered retrieval.

use std::collections::HashSet;

use winning_core::{TableKind, normalize::normalize};

use crate::{
  Error, NOT_FOUND_REPLY, Rag, Result,
  chunk::{column_field, positional_fields},
  index::{Embedder, MetadataFilter, ScoredChunk, TextGenerator, VectorIndex},
};

/// Texts in first-seen order with exact duplicates removed.
pub(crate) fn dedup_texts<T>(texts: impl IntoIterator<Item = T>) -> Vec<String>
where
  T: Into<String>,
{
  let mut seen = HashSet::new();
  texts
    .into_iter()
    .map(Into::into)
    .filter(|t| seen.insert(t.clone()))
    .collect()
}

fn kind_list(kinds: &[TableKind]) -> String {
  kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
}

/// The `(date, club)` a valuation chunk records for a player whose name
/// contains `query`. Reads fielded metadata, falling back to the positional
/// layout of the rendered text.
fn valuation_point(chunk: &ScoredChunk, query: &str) -> Option<(String, String)> {
  let field = |names: &[&str]| {
    names
      .iter()
      .find_map(|n| chunk.metadata.get(&column_field(n)))
      .map(|v| v.trim().to_string())
  };

  let (name, date, club) = match (
    field(&["nombre_jugador", "player_name"]),
    field(&["valuation_date"]),
    field(&["club_nombre", "club_name"]),
  ) {
    (Some(name), Some(date), Some(club)) => (name, date, club),
    _ => {
      let parts = positional_fields(&chunk.text);
      if parts.len() < 7 {
        return None;
      }
      let club = parts.last()?.to_string();
      (parts[1].to_string(), parts[3].to_string(), club)
    }
  };

  normalize(&name).contains(query).then_some((date, club))
}

impl<I, E, G> Rag<I, E, G>
where
  I: VectorIndex,
  E: Embedder,
  G: TextGenerator,
{
  pub(crate) async fn search(
    &self,
    query: &str,
    top_k: usize,
    filter: &MetadataFilter,
  ) -> Result<Vec<ScoredChunk>> {
    let embedding = self.embed(query).await?;
    let hits = self
      .index
      .query(&embedding, top_k, filter)
      .await
      .map_err(Error::index)?;
    tracing::debug!(query, hits = hits.len(), "index queried");
    Ok(hits)
  }

  /// Deduplicated chunk texts for `club`/`season` restricted to `kinds`.
  pub async fn scoped_texts(
    &self,
    club: &str,
    season: &str,
    kinds: &[TableKind],
  ) -> Result<Vec<String>> {
    let club = club.trim().to_lowercase();
    let season = season.trim();
    let query = format!(
      "Datos de {} del club {club} en la temporada {season}",
      kind_list(kinds)
    );
    let filter = MetadataFilter::new()
      .eq("club", club.as_str())
      .eq("season", season)
      .is_in("tipo", kinds.iter().map(|k| k.as_str()));

    let hits = self.search(&query, self.config.top_k, &filter).await?;
    Ok(dedup_texts(hits.into_iter().map(|h| h.text)))
  }

  /// [`Self::scoped_texts`] joined with newlines.
  pub async fn get_context(&self, club: &str, season: &str, kinds: &[TableKind]) -> Result<String> {
    Ok(self.scoped_texts(club, season, kinds).await?.join("\n"))
  }

  /// The club on the player's most recent indexed valuation, or
  /// [`NOT_FOUND_REPLY`].
  pub async fn player_current_club(&self, player_name: &str) -> Result<String> {
    let query = normalize(player_name);
    if query.is_empty() {
      return Ok(NOT_FOUND_REPLY.to_string());
    }
    let filter = MetadataFilter::new().eq("tipo", TableKind::Valuations.as_str());
    let hits = self
      .search(player_name, self.config.player_top_k, &filter)
      .await?;

    let mut candidates: Vec<(String, String)> =
      hits.iter().filter_map(|h| valuation_point(h, &query)).collect();
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(match candidates.pop() {
      Some((date, club)) => {
        tracing::debug!(player = player_name, %date, %club, "current club resolved");
        club
      }
      None => NOT_FOUND_REPLY.to_string(),
    })
  }
}
