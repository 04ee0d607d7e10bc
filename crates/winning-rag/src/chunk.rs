//! Rendering table rows into indexable chunks, and reading them back.

use winning_core::{Table, TableKey, TableKind};

use crate::index::Metadata;

const BOM: char = '\u{feff}';

/// Metadata key for the column `header` of the source row.
pub fn column_field(header: &str) -> String {
  format!("col.{}", header.trim_start_matches(BOM).trim().to_lowercase())
}

/// `{club}_{season}_{kind}_`: every chunk of one table starts with it.
pub fn id_prefix(club: &str, season: &str, kind: TableKind) -> String {
  format!("{club}_{season}_{kind}_")
}

/// Row index encoded in an id under `prefix`, if it is one of ours.
pub fn row_index(id: &str, prefix: &str) -> Option<usize> {
  id.strip_prefix(prefix)?.parse().ok()
}

/// `[tipo=… club=… season=…]`
pub fn header_tag(kind: TableKind, club: &str, season: &str) -> String {
  format!("[tipo={kind} club={club} season={season}]")
}

/// `header: value` lines joined with `, `. Newlines inside values are
/// flattened the same way.
pub fn render_row(headers: &[String], row: &[String]) -> String {
  headers
    .iter()
    .zip(row)
    .map(|(h, v)| format!("{}: {}", h.trim_start_matches(BOM).trim(), v))
    .collect::<Vec<_>>()
    .join("\n")
    .replace(BOM, "")
    .replace("\r\n", "\n")
    .replace('\n', ", ")
}

/// A rendered row before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
  pub id:       String,
  pub text:     String,
  pub metadata: Metadata,
}

/// One chunk per row of `table`, numbered from zero.
pub fn chunks_for(key: &TableKey, table: &Table) -> Vec<Chunk> {
  let (club, season, kind) = (key.club(), key.season(), key.kind());
  let prefix = id_prefix(club, season, kind);
  let tag = header_tag(kind, club, season);

  table
    .rows()
    .iter()
    .enumerate()
    .map(|(i, row)| {
      let text = format!("{tag} {}", render_row(table.headers(), row));
      let mut metadata = Metadata::new();
      for (header, value) in table.headers().iter().zip(row) {
        metadata.insert(column_field(header), value.clone());
      }
      metadata.insert("tipo".into(), kind.to_string());
      metadata.insert("club".into(), club.to_string());
      metadata.insert("season".into(), season.to_string());
      metadata.insert("text".into(), text.clone());
      Chunk { id: format!("{prefix}{i}"), text, metadata }
    })
    .collect()
}

/// The rendered row with its `[…]` tag removed.
pub fn strip_tag(text: &str) -> &str {
  match text.split_once(']') {
    Some((_, rest)) => rest.trim(),
    None => text.trim(),
  }
}

/// Comma-separated values of a rendered row, with any `header: ` prefix
/// dropped. Values that themselves contain commas split into several.
pub fn positional_fields(text: &str) -> Vec<&str> {
  strip_tag(text)
    .split(',')
    .map(|part| {
      let part = part.trim();
      part.split_once(": ").map_or(part, |(_, v)| v.trim())
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valuations() -> (TableKey, Table) {
    let key = TableKey::new("Boca Juniors", "2024", TableKind::Valuations).unwrap();
    let table = Table::from_rows(
      vec!["\u{feff}player_id".into(), "nombre_jugador".into(), "club_nombre".into()],
      vec![vec!["1".into(), "Juan Pérez".into(), "Boca\nJuniors".into()]],
    );
    (key, table)
  }

  #[test]
  fn chunk_text_and_id() {
    let (key, table) = valuations();
    let chunks = chunks_for(&key, &table);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].id, "boca juniors_2024_valuations_0");
    assert_eq!(
      chunks[0].text,
      "[tipo=valuations club=boca juniors season=2024] \
       player_id: 1, nombre_jugador: Juan Pérez, club_nombre: Boca, Juniors"
    );
  }

  #[test]
  fn chunk_metadata_is_fielded() {
    let (key, table) = valuations();
    let meta = &chunks_for(&key, &table)[0].metadata;
    assert_eq!(meta["tipo"], "valuations");
    assert_eq!(meta["club"], "boca juniors");
    assert_eq!(meta["season"], "2024");
    assert_eq!(meta["col.player_id"], "1");
    assert_eq!(meta["col.club_nombre"], "Boca\nJuniors");
    assert!(meta["text"].starts_with("[tipo=valuations"));
  }

  #[test]
  fn positional_fallback() {
    let text = "[tipo=valuations club=x season=2024] 1, Juan, 100, 2024-06-01, 24, 10, Club B";
    let parts = positional_fields(text);
    assert_eq!(parts.len(), 7);
    assert_eq!(parts[1], "Juan");
    assert_eq!(parts[6], "Club B");

    let labelled = "[tipo=valuations] player_id: 1, nombre_jugador: Juan, valuation_date: 2024-06-01";
    assert_eq!(positional_fields(labelled), ["1", "Juan", "2024-06-01"]);
  }

  #[test]
  fn row_index_parses_only_our_ids() {
    let prefix = id_prefix("club a", "2024", TableKind::Players);
    assert_eq!(row_index("club a_2024_players_12", &prefix), Some(12));
    assert_eq!(row_index("club a_2024_players_x", &prefix), None);
    assert_eq!(row_index("club a_2024_altas_1", &prefix), None);
  }
}
