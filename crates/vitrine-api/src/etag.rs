//! ETag computation for published content.
//!
//! The tag is a SHA-256 over the serialized content plus the published
//! version, so a republish of identical content still changes it.

use axum::http::{HeaderMap, header};
use sha2::{Digest, Sha256};
use vitrine_core::manager::PublishedContent;

/// Compute the strong ETag (quoted) for `published`.
pub fn compute_etag(published: &PublishedContent) -> serde_json::Result<String> {
  let mut hasher = Sha256::new();
  hasher.update(serde_json::to_vec(&published.content)?);
  hasher.update(published.version.unwrap_or(0).to_le_bytes());
  Ok(format!("\"{}\"", hex::encode(hasher.finalize())))
}

/// Whether the request's `If-None-Match` header matches `etag`.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(','))
    .map(|t| t.trim())
    .any(|t| t == "*" || t.trim_start_matches("W/") == etag)
}
