//! Handlers for `/transfers` endpoints and the transfer simulator.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/transfers` | Body: `{"club","season"}`; missing ledgers are empty |
//! | `POST` | `/transfers/revenue` | Body: `{"club","season","transfer_budget"}` |
//! | `POST` | `/simulateTransfer` | Body: `{"player","season","from_club","to_club","transfer_amount"}` |

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use winning_core::{
  Error as CoreError, TableKey, TableKind,
  finance::{self, Revenue},
  store::DatasetStore,
  transfer::{TransferRequest, execute_transfer},
};

use crate::{error::ApiError, json::records};

#[derive(Debug, Deserialize)]
pub struct ClubSeason {
  pub club:   String,
  pub season: String,
}

// ─── Ledgers ─────────────────────────────────────────────────────────────────

/// `POST /transfers` returns `{"altas": [...], "bajas": [...]}`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ClubSeason>,
) -> Result<Json<Value>, ApiError>
where
  S: DatasetStore,
{
  let altas_key = TableKey::new(&body.club, &body.season, TableKind::Altas)?;
  let bajas_key = altas_key.with_kind(TableKind::Bajas);

  let altas = store.get(&altas_key).await.map_err(ApiError::store)?.unwrap_or_default();
  let bajas = store.get(&bajas_key).await.map_err(ApiError::store)?.unwrap_or_default();
  Ok(Json(json!({ "altas": records(&altas), "bajas": records(&bajas) })))
}

// ─── Revenue ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RevenueBody {
  pub club:            String,
  pub season:          String,
  pub transfer_budget: f64,
}

/// `POST /transfers/revenue`
pub async fn revenue<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RevenueBody>,
) -> Result<Json<Revenue>, ApiError>
where
  S: DatasetStore,
{
  let balance = finance::revenue(store.as_ref(), &body.club, &body.season, body.transfer_budget).await?;
  Ok(Json(balance))
}

// ─── Simulate ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SimulateBody {
  pub player:          String,
  pub season:          String,
  pub from_club:       String,
  pub to_club:         String,
  pub transfer_amount: u64,
}

impl From<SimulateBody> for TransferRequest {
  fn from(body: SimulateBody) -> Self {
    Self {
      player_name: body.player,
      season:      body.season,
      from_club:   body.from_club,
      to_club:     body.to_club,
      amount:      body.transfer_amount,
    }
  }
}

/// `POST /simulateTransfer`
///
/// A transfer that was only partly written answers 200 with
/// `"status": "warning"` and the tables that did get written.
pub async fn simulate<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<SimulateBody>,
) -> Result<Json<Value>, ApiError>
where
  S: DatasetStore,
{
  let request = TransferRequest::from(body);
  match execute_transfer(store.as_ref(), &request).await {
    Ok(receipt) => {
      tracing::info!(
        player = %request.player_name,
        from = %request.from_club,
        to = %request.to_club,
        amount = request.amount,
        "transfer executed"
      );
      Ok(Json(json!({
        "status":   "success",
        "message":  format!(
          "{} transferido de {} a {}",
          receipt.ledger.player_name, receipt.ledger.from_club, receipt.ledger.to_club
        ),
        "transfer": receipt,
      })))
    }
    Err(CoreError::Persistence { written, failed, source }) => {
      tracing::warn!(player = %request.player_name, failed = %failed, error = %source, "transfer partially persisted");
      Ok(Json(json!({
        "status":  "warning",
        "message": format!("la escritura de {failed} falló: {source}"),
        "written": written.iter().map(TableKey::path).collect::<Vec<_>>(),
        "failed":  failed.path(),
      })))
    }
    Err(e) => Err(e.into()),
  }
}
