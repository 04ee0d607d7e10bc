//! Handlers backed by the RAG pipeline.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/ingest/{club}/{season}` | Runs in the background; answers at once |
//! | `POST` | `/summary/{club}/{season}` | Season financial summary (JSON string) |
//! | `POST` | `/analysis/{club}/{season}` | Squad-depth analysis (JSON string) |
//! | `POST` | `/agent` | Body: `{"question", "history"?}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use winning_core::{TableKey, TableKind, store::DatasetStore};
use winning_rag::{Embedder, TextGenerator, VectorIndex, agent::AgentMessage};

use crate::{AppState, error::ApiError};

// ─── Ingest ──────────────────────────────────────────────────────────────────

/// `POST /ingest/{club}/{season}`: 202 with `{"message"}`; the outcome is
/// only logged.
pub async fn ingest<S, I, E, G>(
  State(state): State<AppState<S, I, E, G>>,
  Path((club, season)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
  S: DatasetStore + 'static,
  I: VectorIndex + 'static,
  E: Embedder + 'static,
  G: TextGenerator + 'static,
{
  // Reject bad keys now rather than in the background task.
  TableKey::new(&club, &season, TableKind::Players)?;

  let message = format!("Ingesta lanzada para {club} {season}");
  let AppState { store, rag } = state;
  tokio::spawn(async move {
    match rag.ingest(store.as_ref(), &club, &season).await {
      Ok(report) => tracing::info!(
        club = %club,
        season = %season,
        chunks = report.total(),
        pruned = report.pruned,
        "background ingest finished"
      ),
      Err(e) => tracing::error!(club = %club, season = %season, error = %e, "background ingest failed"),
    }
  });
  Ok((StatusCode::ACCEPTED, Json(json!({ "message": message }))))
}

// ─── Generation ──────────────────────────────────────────────────────────────

/// `POST /summary/{club}/{season}`
pub async fn summary<S, I, E, G>(
  State(state): State<AppState<S, I, E, G>>,
  Path((club, season)): Path<(String, String)>,
) -> Result<Json<String>, ApiError>
where
  S: DatasetStore + 'static,
  I: VectorIndex + 'static,
  E: Embedder + 'static,
  G: TextGenerator + 'static,
{
  Ok(Json(state.rag.season_summary(&club, &season).await?))
}

/// `POST /analysis/{club}/{season}`
pub async fn analysis<S, I, E, G>(
  State(state): State<AppState<S, I, E, G>>,
  Path((club, season)): Path<(String, String)>,
) -> Result<Json<String>, ApiError>
where
  S: DatasetStore + 'static,
  I: VectorIndex + 'static,
  E: Embedder + 'static,
  G: TextGenerator + 'static,
{
  Ok(Json(state.rag.squad_analysis(&club, &season).await?))
}

// ─── Agent ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AgentBody {
  pub question: String,
  #[serde(default)]
  pub history:  Option<Vec<AgentMessage>>,
}

#[derive(Debug, Serialize)]
pub struct AgentAnswer {
  pub answer: String,
}

/// `POST /agent`
pub async fn agent<S, I, E, G>(
  State(state): State<AppState<S, I, E, G>>,
  Json(body): Json<AgentBody>,
) -> Result<Json<AgentAnswer>, ApiError>
where
  S: DatasetStore + 'static,
  I: VectorIndex + 'static,
  E: Embedder + 'static,
  G: TextGenerator + 'static,
{
  if body.question.trim().is_empty() {
    return Err(ApiError::BadRequest("question is empty".into()));
  }
  let history = body.history.unwrap_or_default();
  let answer = state.rag.agent_reply(&body.question, &history).await?;
  Ok(Json(AgentAnswer { answer }))
}
