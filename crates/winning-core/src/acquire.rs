//! Rebuilding a club's `valuations` table from an external market-value
//! source.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  key::{TableKey, TableKind},
  normalize::is_present,
  record::{ID_COLUMNS, NAME_COLUMNS, ValuationRecord},
  store::DatasetStore,
};

/// Somewhere a player's market-value history can be fetched from.
pub trait ValuationSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Full history for one player, oldest first. `player_name` is copied onto
  /// every record.
  fn valuation_history<'a>(
    &'a self,
    player_id: &'a str,
    player_name: &'a str,
  ) -> impl Future<Output = Result<Vec<ValuationRecord>, Self::Error>> + Send + 'a;
}

/// Outcome of [`refresh_valuations`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
  /// Squad rows with a usable player id.
  pub players: usize,
  /// Squad rows skipped for lack of an id.
  pub skipped: usize,
  /// Players whose history could not be fetched.
  pub failed:  usize,
  /// Valuation rows written.
  pub records: usize,
}

/// Fetch every squad player's history from `source` and replace the
/// `valuations` table of `club`/`season` with the result.
///
/// A failure for one player is logged and counted. When nothing at all was
/// fetched the existing table is left untouched.
pub async fn refresh_valuations<S, V>(
  store: &S,
  source: &V,
  club: &str,
  season: &str,
) -> Result<RefreshReport>
where
  S: DatasetStore,
  V: ValuationSource,
{
  let squad_key = TableKey::new(club, season, TableKind::Players)?;
  let squad = store
    .get(&squad_key)
    .await
    .map_err(Error::upstream)?
    .ok_or_else(|| Error::SquadNotFound(squad_key.clone()))?;

  let id_col = squad.column(ID_COLUMNS).ok_or_else(|| Error::SchemaError {
    key:      squad_key.clone(),
    expected: "player id",
    headers:  squad.headers().to_vec(),
  })?;
  let name_col = squad.column(NAME_COLUMNS);

  let mut report = RefreshReport::default();
  let mut records = Vec::new();
  for row in 0..squad.len() {
    let id = squad.cell(row, id_col).trim();
    if !is_present(id) {
      report.skipped += 1;
      continue;
    }
    report.players += 1;
    let name = name_col.map(|col| squad.cell(row, col).trim()).unwrap_or("");

    match source.valuation_history(id, name).await {
      Ok(history) => {
        tracing::debug!(player_id = id, points = history.len(), "fetched valuations");
        records.extend(history);
      }
      Err(e) => {
        tracing::warn!(player_id = id, player = name, error = %e, "valuation fetch failed");
        report.failed += 1;
      }
    }
  }

  if records.is_empty() {
    tracing::warn!(club, season, "no valuations fetched; table left unchanged");
    return Ok(report);
  }

  let key = squad_key.with_kind(TableKind::Valuations);
  let table = ValuationRecord::table(&records);
  store.put(&key, &table).await.map_err(|e| Error::Persistence {
    written: Vec::new(),
    failed:  key.clone(),
    source:  Box::new(e),
  })?;
  report.records = records.len();

  tracing::info!(
    club,
    season,
    players = report.players,
    failed = report.failed,
    records = report.records,
    "valuations refreshed"
  );
  Ok(report)
}
