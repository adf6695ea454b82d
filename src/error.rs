//! Request-level errors surfaced by the engine, plus their HTTP mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::protocol::ErrorOut;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },
}

impl EngineError {
  pub fn user_not_found(id: &str) -> Self {
    EngineError::NotFound { kind: "user", id: id.to_string() }
  }

  pub fn challenge_not_found(id: &str) -> Self {
    EngineError::NotFound { kind: "challenge", id: id.to_string() }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      EngineError::Validation(_) => StatusCode::BAD_REQUEST,
      EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
    }
  }
}

impl IntoResponse for EngineError {
  fn into_response(self) -> axum::response::Response {
    (self.status(), Json(ErrorOut { error: self.to_string() })).into_response()
  }
}
