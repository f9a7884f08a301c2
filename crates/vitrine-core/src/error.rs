//! Error types for `vitrine-core`.
//!
//! Every [`crate::manager::ContentManager`] operation returns these as a
//! tagged result; nothing past that boundary panics on bad input.

use thiserror::Error;
use uuid::Uuid;

use crate::{lock::LockInfo, schema::ValidationErrors, section::SectionType};

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error(
    "section {section_type} is locked by {} until {}",
    .lock.locked_by,
    .lock.locked_until
  )]
  LockConflict {
    section_type: SectionType,
    lock:         LockInfo,
  },

  #[error("section not found: {0}")]
  SectionNotFound(SectionType),

  #[error("section not found: {0}")]
  SectionIdNotFound(Uuid),

  #[error("version {version} not found for section {section_id}")]
  VersionNotFound { section_id: Uuid, version: u32 },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse failure category, for callers that only need to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  LockConflict,
  NotFound,
  Internal,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::LockConflict { .. } => ErrorKind::LockConflict,
      Self::SectionNotFound(_)
      | Self::SectionIdNotFound(_)
      | Self::VersionNotFound { .. } => ErrorKind::NotFound,
      Self::Serialization(_) | Self::Store(_) => ErrorKind::Internal,
    }
  }

  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
