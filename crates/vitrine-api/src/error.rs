//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is JSON with at least an `error` message. Validation
//! failures add the field-level `fields` list; lock conflicts add the holder
//! and expiry so an editor can say who to wait for.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use vitrine_core::{ErrorKind, lock::LockInfo, schema::ValidationErrors};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("missing caller identity")]
  Unauthorized,

  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("locked by {} until {}", .0.locked_by, .0.locked_until)]
  LockConflict(LockInfo),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<vitrine_core::Error> for ApiError {
  fn from(e: vitrine_core::Error) -> Self {
    match e {
      vitrine_core::Error::Validation(errors) => ApiError::Validation(errors),
      vitrine_core::Error::LockConflict { lock, .. } => ApiError::LockConflict(lock),
      other => match other.kind() {
        ErrorKind::NotFound => ApiError::NotFound(other.to_string()),
        _ => ApiError::Store(Box::new(other)),
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    let (status, body) = match self {
      ApiError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": message })),
      ApiError::BadRequest(_) => {
        (StatusCode::BAD_REQUEST, json!({ "error": message }))
      }
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, json!({ "error": message }))
      }
      ApiError::Validation(errors) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "error": "validation failed", "fields": errors }),
      ),
      ApiError::LockConflict(lock) => (
        StatusCode::CONFLICT,
        json!({
          "error":       message,
          "lockedBy":    lock.locked_by,
          "lockedUntil": lock.locked_until,
        }),
      ),
      ApiError::Store(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
      }
    };
    (status, Json(body)).into_response()
  }
}
