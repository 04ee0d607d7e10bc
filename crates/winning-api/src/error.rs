//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use winning_core::Error as CoreError;

/// An error returned by an API handler. Rendered as
/// `{"status": "error", "message": …}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] CoreError),

  #[error(transparent)]
  Rag(#[from] winning_rag::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error from a trait-bound store.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(e) | ApiError::Rag(winning_rag::Error::Core(e)) => core_status(e),
      ApiError::Rag(_) => StatusCode::BAD_GATEWAY,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

fn core_status(err: &CoreError) -> StatusCode {
  match err {
    e if e.is_not_found() => StatusCode::NOT_FOUND,
    CoreError::InvalidKey(_) => StatusCode::BAD_REQUEST,
    CoreError::AmbiguousMatch { .. } => StatusCode::CONFLICT,
    CoreError::SchemaError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    CoreError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
    _ => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "status": "error", "message": self.to_string() }))).into_response()
  }
}
