//! The `SectionStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `vitrine-store-sqlite`).
//! [`crate::manager::ContentManager`] is the only caller; it enforces the
//! validation and locking rules, so backends only guarantee the atomicity
//! each method documents.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  content::SectionContent,
  lock::LockOutcome,
  section::{ContentSection, ContentVersion, SectionStatus, SectionType, SectionUpdate},
};

/// Abstraction over a section content backend.
///
/// Holds one row per [`SectionType`] plus an append-only history per row.
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SectionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sections ──────────────────────────────────────────────────────────

  fn get_by_type(
    &self,
    section_type: SectionType,
  ) -> impl Future<Output = Result<Option<ContentSection>, Self::Error>> + Send + '_;

  fn get_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ContentSection>, Self::Error>> + Send + '_;

  /// Like [`SectionStore::get_by_type`], but only returns rows whose status
  /// is [`SectionStatus::Published`].
  fn get_published_by_type(
    &self,
    section_type: SectionType,
  ) -> impl Future<Output = Result<Option<ContentSection>, Self::Error>> + Send + '_;

  /// Create the row for `section_type` or merge `update` into it.
  ///
  /// A new row takes the registry default for omitted content. Content must
  /// already be normalized; a variant that disagrees with `section_type` is
  /// rejected without writing anything. Last write wins.
  fn upsert(
    &self,
    section_type: SectionType,
    update: SectionUpdate,
  ) -> impl Future<Output = Result<ContentSection, Self::Error>> + Send + '_;

  /// Remove the row and its whole history. Returns `false` if there was no
  /// row.
  fn delete(
    &self,
    section_type: SectionType,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All rows, ordered by section type key.
  fn list_all(
    &self,
    status: Option<SectionStatus>,
  ) -> impl Future<Output = Result<Vec<ContentSection>, Self::Error>> + Send + '_;

  // ── Locks ─────────────────────────────────────────────────────────────

  /// Grant `caller` the lock until `until` if the section is unlocked, its
  /// lock expired at or before `now`, or `caller` already holds it.
  ///
  /// Must be a single conditional write: of any number of concurrent calls
  /// against an unlocked section, exactly one observes
  /// [`LockOutcome::Acquired`]. Returns `None` if the row does not exist.
  fn acquire_lock(
    &self,
    section_type: SectionType,
    caller: String,
    now: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<LockOutcome>, Self::Error>> + Send + '_;

  /// Clear the lock only if `caller` holds it. Returns whether anything was
  /// cleared; releasing someone else's lock is not an error.
  fn release_lock(
    &self,
    section_type: SectionType,
    caller: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// Append a snapshot with the next version number for `section_id` and
  /// move the section's `version` counter to match, atomically with respect
  /// to every other history write on the same section.
  fn append_version(
    &self,
    section_id: Uuid,
    content: SectionContent,
    created_by: String,
    change_summary: String,
  ) -> impl Future<Output = Result<ContentVersion, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_versions(
    &self,
    section_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ContentVersion>, Self::Error>> + Send + '_;

  fn get_version(
    &self,
    section_id: Uuid,
    version_number: u32,
  ) -> impl Future<Output = Result<Option<ContentVersion>, Self::Error>> + Send + '_;

  /// In one transaction: snapshot the live content as a new version, then
  /// mark the section published at that version. Returns `None` if the row
  /// does not exist.
  fn publish(
    &self,
    section_type: SectionType,
    caller: String,
    change_summary: String,
  ) -> impl Future<
    Output = Result<Option<(ContentSection, ContentVersion)>, Self::Error>,
  > + Send
  + '_;

  /// In one transaction: snapshot the live content as a new version, then
  /// replace the live content with version `target`'s content and set the
  /// status back to draft. `published_version` is left alone, so public
  /// reads keep serving the last published snapshot. Returns `None` if the
  /// section or the target version does not exist.
  fn revert(
    &self,
    section_id: Uuid,
    target: u32,
    caller: String,
  ) -> impl Future<
    Output = Result<Option<(ContentSection, ContentVersion)>, Self::Error>,
  > + Send
  + '_;
}
