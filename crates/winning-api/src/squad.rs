//! Handlers for squad and player lookups.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/squad/{club}/{season}` | 404 if the squad is absent |
//! | `POST` | `/playerInfo` | Body: `{"name","club","season"}` |
//! | `POST` | `/valuations` | Body: `{"club","season","player"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use winning_core::{
  Error as CoreError, Table, TableKey, TableKind,
  normalize::normalize,
  record::{NAME_COLUMNS, VALUATION_AMOUNT_COLUMNS, VALUATION_DATE_COLUMNS},
  store::DatasetStore,
};

use crate::{
  error::ApiError,
  json::{cell_value, records, row_record},
};

/// Read a table, treating absence as a 404.
pub(crate) async fn load<S>(store: &S, key: &TableKey) -> Result<Table, ApiError>
where
  S: DatasetStore,
{
  store
    .get(key)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| CoreError::DatasetNotFound(key.clone()).into())
}

/// Rows whose normalized name contains the normalized `query`.
fn matching_rows(table: &Table, name_col: usize, query: &str) -> Vec<usize> {
  let query = normalize(query);
  table.positions(name_col, |name| normalize(name).contains(&query))
}

fn name_column(table: &Table, key: &TableKey) -> Result<usize, ApiError> {
  table.column(NAME_COLUMNS).ok_or_else(|| {
    CoreError::SchemaError {
      key:      key.clone(),
      expected: "player name",
      headers:  table.headers().to_vec(),
    }
    .into()
  })
}

// ─── Squad ───────────────────────────────────────────────────────────────────

/// `GET /squad/{club}/{season}`
pub async fn get_squad<S>(
  State(store): State<Arc<S>>,
  Path((club, season)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError>
where
  S: DatasetStore,
{
  let key = TableKey::new(&club, &season, TableKind::Players)?;
  let squad = load(store.as_ref(), &key).await?;
  Ok(Json(json!({
    "status": "success",
    "source": "cache",
    "data":   records(&squad),
  })))
}

// ─── Player info ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PlayerInfoBody {
  pub name:   String,
  pub club:   String,
  pub season: String,
}

/// `POST /playerInfo`: the first squad row whose name contains `name`.
pub async fn player_info<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<PlayerInfoBody>,
) -> Result<Json<Value>, ApiError>
where
  S: DatasetStore,
{
  let key = TableKey::new(&body.club, &body.season, TableKind::Players)?;
  let squad = load(store.as_ref(), &key).await?;
  let col = name_column(&squad, &key)?;

  let Some(&row) = matching_rows(&squad, col, &body.name).first() else {
    return Ok(Json(json!({
      "status":  "error",
      "message": "Jugador no encontrado",
      "buscado": body.name,
    })));
  };
  Ok(Json(json!({ "status": "success", "data": row_record(&squad, row) })))
}

// ─── Valuations ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ValuationsBody {
  pub club:   String,
  pub season: String,
  pub player: String,
}

/// `POST /valuations`: `[{valuation_amount, valuation_date}]` for every
/// matching row, in table order.
pub async fn valuations<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ValuationsBody>,
) -> Result<Json<Vec<Value>>, ApiError>
where
  S: DatasetStore,
{
  let key = TableKey::new(&body.club, &body.season, TableKind::Valuations)?;
  let table = load(store.as_ref(), &key).await?;
  let name_col = name_column(&table, &key)?;
  let amount_col = table.column(VALUATION_AMOUNT_COLUMNS);
  let date_col = table.column(VALUATION_DATE_COLUMNS);

  let cell = |row: usize, col: Option<usize>| col.map_or(Value::Null, |c| cell_value(table.cell(row, c)));
  let out = matching_rows(&table, name_col, &body.player)
    .into_iter()
    .map(|row| {
      json!({
        "valuation_amount": cell(row, amount_col),
        "valuation_date":   cell(row, date_col),
      })
    })
    .collect();
  Ok(Json(out))
}
