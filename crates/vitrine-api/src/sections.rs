//! Handlers for `/sections` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/sections` | Optional `?status=draft\|published` |
//! | `GET`    | `/sections/:type` | Editor view; `canEdit` is computed for the caller |
//! | `PUT`    | `/sections/:type` | Body: `{"content":{..},"title":"..."}`; saves a draft |
//! | `PATCH`  | `/sections/:type` | Body: `{"status":"published"}` |
//! | `DELETE` | `/sections/:type` | 204; removes history too |
//! | `GET`    | `/sections/:type/published` | Public read; honours `If-None-Match` |
//! | `GET`    | `/sections/:type/default` | Registry default content |
//! | `POST`   | `/sections/:type/lock` | Optional body: `{"durationMinutes":30}` |
//! | `POST`   | `/sections/:type/unlock` | 204, also when the caller held nothing |

use std::{str::FromStr as _, sync::Arc};

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use vitrine_core::{
  content::SectionContent,
  lock::LockInfo,
  manager::{ContentManager, SectionView},
  schema,
  section::{ContentSection, SectionStatus, SectionType},
  store::SectionStore,
};

use crate::{
  caller::Caller,
  error::ApiError,
  etag::{compute_etag, if_none_match},
};

/// Parse the `{type}` path segment. Underscore aliases are accepted.
pub(crate) fn parse_section_type(raw: &str) -> Result<SectionType, ApiError> {
  SectionType::from_str(raw)
    .map_err(|_| ApiError::NotFound(format!("unknown section type: {raw}")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<SectionStatus>,
}

/// `GET /sections[?status=<status>]`
pub async fn list<S>(
  State(manager): State<Arc<ContentManager<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ContentSection>>, ApiError>
where
  S: SectionStore + 'static,
{
  Ok(Json(manager.list_sections(params.status).await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /sections/:type`
pub async fn get_one<S>(
  State(manager): State<Arc<ContentManager<S>>>,
  Path(raw): Path<String>,
  caller: Option<Caller>,
) -> Result<Json<SectionView>, ApiError>
where
  S: SectionStore + 'static,
{
  let section_type = parse_section_type(&raw)?;
  let view = manager
    .get_section(section_type, caller.as_ref().map(Caller::as_str))
    .await?;
  Ok(Json(view))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub content: Value,
  #[serde(default)]
  pub title:   Option<String>,
}

/// `PUT /sections/:type` — body: `{"content":{..}}`
pub async fn update<S>(
  State(manager): State<Arc<ContentManager<S>>>,
  Path(raw): Path<String>,
  caller: Caller,
  Json(body): Json<UpdateBody>,
) -> Result<Json<ContentSection>, ApiError>
where
  S: SectionStore + 'static,
{
  let section_type = parse_section_type(&raw)?;
  let section = manager
    .update_section(section_type, body.content, body.title, caller.as_str())
    .await?;
  Ok(Json(section))
}

// ─── Publish ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PublishBody {
  pub status: SectionStatus,
}

/// `PATCH /sections/:type` — body: `{"status":"published"}`
pub async fn publish<S>(
  State(manager): State<Arc<ContentManager<S>>>,
  Path(raw): Path<String>,
  caller: Caller,
  Json(body): Json<PublishBody>,
) -> Result<Json<ContentSection>, ApiError>
where
  S: SectionStore + 'static,
{
  let section_type = parse_section_type(&raw)?;
  if body.status != SectionStatus::Published {
    return Err(ApiError::BadRequest(
      "only {\"status\":\"published\"} is supported; save content to return to draft"
        .to_owned(),
    ));
  }
  let section = manager.publish_section(section_type, caller.as_str()).await?;
  Ok(Json(section))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /sections/:type`
pub async fn delete<S>(
  State(manager): State<Arc<ContentManager<S>>>,
  Path(raw): Path<String>,
  caller: Caller,
) -> Result<StatusCode, ApiError>
where
  S: SectionStore + 'static,
{
  let section_type = parse_section_type(&raw)?;
  manager.delete_section(section_type, caller.as_str()).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Public read ──────────────────────────────────────────────────────────────

/// `GET /sections/:type/published`
pub async fn published<S>(
  State(manager): State<Arc<ContentManager<S>>>,
  Path(raw): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: SectionStore + 'static,
{
  let section_type = parse_section_type(&raw)?;
  let published = manager.get_published_section(section_type).await?;
  let etag = compute_etag(&published).map_err(|e| ApiError::Store(Box::new(e)))?;
  let etag_value = HeaderValue::from_str(&etag)
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if if_none_match(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag_value)]).into_response());
  }
  Ok(([(header::ETAG, etag_value)], Json(published)).into_response())
}

// ─── Default ──────────────────────────────────────────────────────────────────

/// `GET /sections/:type/default`
pub async fn default_content(
  Path(raw): Path<String>,
) -> Result<Json<SectionContent>, ApiError> {
  let section_type = parse_section_type(&raw)?;
  Ok(Json(schema::default_content(section_type)))
}

// ─── Locks ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockBody {
  pub duration_minutes: Option<u32>,
}

/// `POST /sections/:type/lock` — optional body: `{"durationMinutes":30}`
pub async fn lock<S>(
  State(manager): State<Arc<ContentManager<S>>>,
  Path(raw): Path<String>,
  caller: Caller,
  body: Bytes,
) -> Result<Json<LockInfo>, ApiError>
where
  S: SectionStore + 'static,
{
  let section_type = parse_section_type(&raw)?;
  let body: LockBody = if body.iter().all(u8::is_ascii_whitespace) {
    LockBody::default()
  } else {
    serde_json::from_slice(&body)
      .map_err(|e| ApiError::BadRequest(format!("invalid lock request: {e}")))?
  };
  let lock = manager
    .lock_section(section_type, caller.as_str(), body.duration_minutes)
    .await?;
  Ok(Json(lock))
}

/// `POST /sections/:type/unlock`
pub async fn unlock<S>(
  State(manager): State<Arc<ContentManager<S>>>,
  Path(raw): Path<String>,
  caller: Caller,
) -> Result<StatusCode, ApiError>
where
  S: SectionStore + 'static,
{
  let section_type = parse_section_type(&raw)?;
  manager.unlock_section(section_type, caller.as_str()).await?;
  Ok(StatusCode::NO_CONTENT)
}
