//! [`ContentManager`] — the public operations over a [`SectionStore`].
//!
//! Construct one per process and share it (e.g. behind an `Arc`) with every
//! request handler. All validation and lock checks happen here; the store
//! below only provides atomic reads and writes.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
  Error, Result,
  content::SectionContent,
  lock::{Clock, LockInfo, LockOutcome, LockOverride, SystemClock, can_edit},
  schema,
  section::{
    ContentSection, ContentVersion, PUBLISH_SUMMARY, SectionStatus, SectionType,
    SectionUpdate,
  },
  store::SectionStore,
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ManagerConfig {
  /// Lock duration when the caller does not ask for one.
  pub default_lock_minutes: u32,
  /// Requested durations are clamped to `1..=max_lock_minutes`.
  pub max_lock_minutes:     u32,
  pub lock_override:        LockOverride,
}

impl Default for ManagerConfig {
  fn default() -> Self {
    Self {
      default_lock_minutes: 30,
      max_lock_minutes:     240,
      lock_override:        LockOverride::disabled(),
    }
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// What the editor sees for one section.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
  pub section_type: SectionType,
  /// `None` until the section is first written.
  pub section:      Option<ContentSection>,
  /// The live content, or the registry default for an unwritten section.
  pub content:      SectionContent,
  pub can_edit:     bool,
  /// The active lock, if any. Expired locks are not reported.
  pub lock:         Option<LockInfo>,
}

/// What the public site renders for one section.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedContent {
  pub section_type: SectionType,
  pub content:      SectionContent,
  pub version:      Option<u32>,
  pub published_at: Option<DateTime<Utc>>,
  /// `true` when nothing was ever published and `content` is the default.
  pub is_default:   bool,
}

// ─── Manager ─────────────────────────────────────────────────────────────────

pub struct ContentManager<S> {
  store:  S,
  config: ManagerConfig,
  clock:  Arc<dyn Clock>,
}

impl<S: SectionStore> ContentManager<S> {
  pub fn new(store: S, config: ManagerConfig) -> Self {
    if config.lock_override.is_enabled() {
      tracing::warn!(
        callers = ?config.lock_override.callers().collect::<Vec<_>>(),
        "lock override enabled; these callers can edit through any lock"
      );
    }
    Self { store, config, clock: Arc::new(SystemClock) }
  }

  /// Replace the system clock, e.g. with a [`crate::lock::ManualClock`].
  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn config(&self) -> &ManagerConfig { &self.config }

  fn lock_duration(&self, minutes: Option<u32>) -> Duration {
    let max = self.config.max_lock_minutes.max(1);
    let minutes = minutes
      .unwrap_or(self.config.default_lock_minutes)
      .clamp(1, max);
    Duration::minutes(i64::from(minutes))
  }

  /// Refuse if someone other than `caller` holds an active lock.
  fn ensure_editable(&self, section: &ContentSection, caller: &str) -> Result<()> {
    match section.active_lock(self.clock.now()) {
      Some(lock)
        if !can_edit(Some(&lock), Some(caller), &self.config.lock_override) =>
      {
        Err(Error::LockConflict { section_type: section.section_type, lock })
      }
      _ => Ok(()),
    }
  }

  async fn require(&self, section_type: SectionType) -> Result<ContentSection> {
    self
      .store
      .get_by_type(section_type)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SectionNotFound(section_type))
  }

  async fn require_id(&self, section_id: Uuid) -> Result<ContentSection> {
    self
      .store
      .get_by_id(section_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SectionIdNotFound(section_id))
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The section as an editor sees it, plus whether `caller` may edit it.
  /// Never writes.
  pub async fn get_section(
    &self,
    section_type: SectionType,
    caller: Option<&str>,
  ) -> Result<SectionView> {
    let section = self
      .store
      .get_by_type(section_type)
      .await
      .map_err(Error::store)?;

    let lock = section
      .as_ref()
      .and_then(|s| s.active_lock(self.clock.now()));
    let can_edit = can_edit(lock.as_ref(), caller, &self.config.lock_override);
    let content = section.as_ref().map_or_else(
      || schema::default_content(section_type),
      |s| s.content.clone(),
    );

    Ok(SectionView { section_type, section, content, can_edit, lock })
  }

  /// Renderable content for the public site. Never reports "not found".
  ///
  /// A section saved as a draft after its last publish keeps serving the
  /// snapshot that publish recorded.
  pub async fn get_published_section(
    &self,
    section_type: SectionType,
  ) -> Result<PublishedContent> {
    if let Some(live) = self
      .store
      .get_published_by_type(section_type)
      .await
      .map_err(Error::store)?
    {
      return Ok(PublishedContent {
        section_type,
        content: live.content,
        version: live.published_version,
        published_at: live.published_at,
        is_default: false,
      });
    }

    let draft = self
      .store
      .get_by_type(section_type)
      .await
      .map_err(Error::store)?;

    if let Some(draft) = draft
      && let Some(published_version) = draft.published_version
    {
      let snapshot = self
        .store
        .get_version(draft.id, published_version)
        .await
        .map_err(Error::store)?;
      if let Some(snapshot) = snapshot {
        return Ok(PublishedContent {
          section_type,
          content: snapshot.content,
          version: Some(published_version),
          published_at: draft.published_at,
          is_default: false,
        });
      }
    }

    tracing::debug!(section = %section_type, "serving default content");
    Ok(PublishedContent {
      section_type,
      content: schema::default_content(section_type),
      version: None,
      published_at: None,
      is_default: true,
    })
  }

  pub async fn list_sections(
    &self,
    status: Option<SectionStatus>,
  ) -> Result<Vec<ContentSection>> {
    self.store.list_all(status).await.map_err(Error::store)
  }

  /// History for `section_id`, newest first.
  pub async fn history(&self, section_id: Uuid) -> Result<Vec<ContentVersion>> {
    self.require_id(section_id).await?;
    self
      .store
      .list_versions(section_id)
      .await
      .map_err(Error::store)
  }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Migrate, validate and save `content` as a draft. Creates the section on
  /// first write. Draft saves are not versioned. Lock conflicts are reported
  /// before validation errors.
  pub async fn update_section(
    &self,
    section_type: SectionType,
    content: Value,
    title: Option<String>,
    caller: &str,
  ) -> Result<ContentSection> {
    if let Some(existing) = self
      .store
      .get_by_type(section_type)
      .await
      .map_err(Error::store)?
    {
      self.ensure_editable(&existing, caller)?;
    }

    let normalized =
      schema::normalize(section_type, content).map_err(Error::Validation)?;

    let update = SectionUpdate::new(caller)
      .with_content(normalized)
      .with_status(SectionStatus::Draft)
      .with_title(title);

    let section = self
      .store
      .upsert(section_type, update)
      .await
      .map_err(Error::store)?;

    tracing::debug!(section = %section_type, caller, "saved draft");
    Ok(section)
  }

  /// Snapshot the current content into history and mark it live.
  pub async fn publish_section(
    &self,
    section_type: SectionType,
    caller: &str,
  ) -> Result<ContentSection> {
    let existing = self.require(section_type).await?;
    self.ensure_editable(&existing, caller)?;

    let (section, version) = self
      .store
      .publish(section_type, caller.to_owned(), PUBLISH_SUMMARY.to_owned())
      .await
      .map_err(Error::store)?
      .ok_or(Error::SectionNotFound(section_type))?;

    tracing::info!(
      section = %section_type,
      version = version.version_number,
      caller,
      "published section"
    );
    Ok(section)
  }

  /// Restore version `target` of `section_id` as a draft. The content live
  /// before the revert is recorded as a new version first.
  pub async fn revert(
    &self,
    section_id: Uuid,
    target: u32,
    caller: &str,
  ) -> Result<ContentSection> {
    let existing = self.require_id(section_id).await?;
    self.ensure_editable(&existing, caller)?;

    let (section, snapshot) = self
      .store
      .revert(section_id, target, caller.to_owned())
      .await
      .map_err(Error::store)?
      .ok_or(Error::VersionNotFound { section_id, version: target })?;

    tracing::info!(
      section = %section.section_type,
      target,
      snapshot = snapshot.version_number,
      caller,
      "reverted section"
    );
    Ok(section)
  }

  pub async fn revert_section(
    &self,
    section_type: SectionType,
    target: u32,
    caller: &str,
  ) -> Result<ContentSection> {
    let section = self.require(section_type).await?;
    self.revert(section.id, target, caller).await
  }

  /// Delete the section and its history.
  pub async fn delete_section(
    &self,
    section_type: SectionType,
    caller: &str,
  ) -> Result<()> {
    let existing = self.require(section_type).await?;
    self.ensure_editable(&existing, caller)?;

    let deleted = self
      .store
      .delete(section_type)
      .await
      .map_err(Error::store)?;
    if !deleted {
      return Err(Error::SectionNotFound(section_type));
    }

    tracing::info!(section = %section_type, caller, "deleted section");
    Ok(())
  }

  // ── Locks ─────────────────────────────────────────────────────────────

  /// Take (or extend) the lock on a section. Creates the section with
  /// default content if it was never written, so the lock has a row to live
  /// on. That row is an ordinary draft and can be published like one.
  pub async fn lock_section(
    &self,
    section_type: SectionType,
    caller: &str,
    duration_minutes: Option<u32>,
  ) -> Result<LockInfo> {
    let exists = self
      .store
      .get_by_type(section_type)
      .await
      .map_err(Error::store)?
      .is_some();
    if !exists {
      self
        .store
        .upsert(section_type, SectionUpdate::new(caller))
        .await
        .map_err(Error::store)?;
    }

    let now = self.clock.now();
    let until = now + self.lock_duration(duration_minutes);

    match self
      .store
      .acquire_lock(section_type, caller.to_owned(), now, until)
      .await
      .map_err(Error::store)?
    {
      Some(LockOutcome::Acquired(lock)) => {
        tracing::info!(
          section = %section_type,
          caller,
          until = %lock.locked_until,
          "lock acquired"
        );
        Ok(lock)
      }
      Some(LockOutcome::Held(lock)) => {
        tracing::warn!(
          section = %section_type,
          caller,
          holder = %lock.locked_by,
          "lock refused"
        );
        Err(Error::LockConflict { section_type, lock })
      }
      None => Err(Error::SectionNotFound(section_type)),
    }
  }

  /// Release `caller`'s lock. A no-op if `caller` does not hold it.
  pub async fn unlock_section(
    &self,
    section_type: SectionType,
    caller: &str,
  ) -> Result<()> {
    let released = self
      .store
      .release_lock(section_type, caller.to_owned())
      .await
      .map_err(Error::store)?;

    if released {
      tracing::info!(section = %section_type, caller, "lock released");
    } else {
      tracing::debug!(section = %section_type, caller, "nothing to release");
    }
    Ok(())
  }
}
