//! Handlers for `/history` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/history/:section_id` | Newest first; 404 for an unknown section |
//! | `POST` | `/history/:section_id/revert` | Body: `{"versionNumber":3}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;
use vitrine_core::{
  manager::ContentManager,
  section::{ContentSection, ContentVersion},
  store::SectionStore,
};

use crate::{caller::Caller, error::ApiError};

/// `GET /history/:section_id`
pub async fn list<S>(
  State(manager): State<Arc<ContentManager<S>>>,
  Path(section_id): Path<Uuid>,
) -> Result<Json<Vec<ContentVersion>>, ApiError>
where
  S: SectionStore + 'static,
{
  Ok(Json(manager.history(section_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertBody {
  pub version_number: u32,
}

/// `POST /history/:section_id/revert` — body: `{"versionNumber":3}`
pub async fn revert<S>(
  State(manager): State<Arc<ContentManager<S>>>,
  Path(section_id): Path<Uuid>,
  caller: Caller,
  Json(body): Json<RevertBody>,
) -> Result<Json<ContentSection>, ApiError>
where
  S: SectionStore + 'static,
{
  let section = manager
    .revert(section_id, body.version_number, caller.as_str())
    .await?;
  Ok(Json(section))
}
