//! JSON REST API for the transfer-market tool.
//!
//! Exposes an axum [`Router`] backed by any [`DatasetStore`] and a
//! [`Rag`] pipeline. TLS and auth are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", winning_api::api_router(state, &config.cors_origins))
//! ```

pub mod error;
pub mod json;
pub mod rag;
pub mod squad;
pub mod transfers;

use std::sync::Arc;

use axum::{
  Router,
  extract::FromRef,
  http::{HeaderValue, Method},
  routing::{get, post},
};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};
use winning_core::store::DatasetStore;
use winning_rag::{Embedder, Rag, TextGenerator, VectorIndex};

pub use error::ApiError;

/// Browser origins allowed by default (the local dashboard dev server).
pub const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared handler state: the dataset store and the RAG pipeline.
pub struct AppState<S, I, E, G> {
  pub store: Arc<S>,
  pub rag:   Arc<Rag<I, E, G>>,
}

impl<S, I, E, G> AppState<S, I, E, G> {
  pub fn new(store: Arc<S>, rag: Arc<Rag<I, E, G>>) -> Self { Self { store, rag } }
}

// Manual impl: the derive would require every type parameter to be `Clone`.
impl<S, I, E, G> Clone for AppState<S, I, E, G> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), rag: self.rag.clone() }
  }
}

// RAG handlers extract the whole `AppState`; a second `FromRef` for the
// pipeline would overlap this one when `S = Rag<I, E, G>`.
impl<S, I, E, G> FromRef<AppState<S, I, E, G>> for Arc<S> {
  fn from_ref(state: &AppState<S, I, E, G>) -> Self { state.store.clone() }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router with CORS for `origins` and request tracing.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, I, E, G>(state: AppState<S, I, E, G>, origins: &[String]) -> Router<()>
where
  S: DatasetStore + 'static,
  I: VectorIndex + 'static,
  E: Embedder + 'static,
  G: TextGenerator + 'static,
{
  Router::new()
    // Squad and players
    .route("/squad/{club}/{season}", get(squad::get_squad::<S>))
    .route("/playerInfo", post(squad::player_info::<S>))
    .route("/valuations", post(squad::valuations::<S>))
    // Transfers
    .route("/transfers", post(transfers::list::<S>))
    .route("/transfers/revenue", post(transfers::revenue::<S>))
    .route("/simulateTransfer", post(transfers::simulate::<S>))
    // Retrieval and generation
    .route("/ingest/{club}/{season}", post(rag::ingest::<S, I, E, G>))
    .route("/summary/{club}/{season}", post(rag::summary::<S, I, E, G>))
    .route("/analysis/{club}/{season}", post(rag::analysis::<S, I, E, G>))
    .route("/agent", post(rag::agent::<S, I, E, G>))
    .layer(cors(origins))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// CORS for the given origins; unparsable origins are skipped with a warning.
fn cors(origins: &[String]) -> CorsLayer {
  let allowed: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|o| match HeaderValue::from_str(o) {
      Ok(v) => Some(v),
      Err(_) => {
        tracing::warn!(origin = %o, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();
  CorsLayer::new()
    .allow_origin(allowed)
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers(Any)
}
