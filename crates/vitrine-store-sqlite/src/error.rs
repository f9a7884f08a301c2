//! Error type for `vitrine-store-sqlite`.

use thiserror::Error;
use vitrine_core::section::SectionType;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] vitrine_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside its closed set (status, section type).
  #[error("unexpected column value: {0}")]
  Decode(String),

  #[error("section not found: {0}")]
  SectionNotFound(uuid::Uuid),

  /// Content of one section type was offered to another section's row.
  #[error("content for {found} cannot be stored in section {expected}")]
  SectionTypeMismatch {
    expected: SectionType,
    found:    SectionType,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
