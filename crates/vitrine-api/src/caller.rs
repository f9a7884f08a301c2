//! Caller identity, as supplied by the identity layer in front of the API.

use axum::{
  extract::{FromRequestParts, OptionalFromRequestParts},
  http::request::Parts,
};

use crate::error::ApiError;

/// Header carrying the authenticated caller's id.
pub const CALLER_HEADER: &str = "x-caller-id";

/// The id of the caller making the request.
///
/// Required for writes; use `Option<Caller>` on read-only routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
  pub fn as_str(&self) -> &str { &self.0 }
}

fn caller_from_parts(parts: &Parts) -> Result<Option<Caller>, ApiError> {
  let Some(value) = parts.headers.get(CALLER_HEADER) else {
    return Ok(None);
  };
  let id = value
    .to_str()
    .map_err(|_| ApiError::BadRequest(format!("{CALLER_HEADER} is not valid text")))?
    .trim();
  if id.is_empty() {
    return Ok(None);
  }
  Ok(Some(Caller(id.to_owned())))
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    caller_from_parts(parts)?.ok_or(ApiError::Unauthorized)
  }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Option<Self>, Self::Rejection> {
    caller_from_parts(parts)
  }
}
