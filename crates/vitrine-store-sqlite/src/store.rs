//! [`SqliteStore`] — the SQLite implementation of [`SectionStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use vitrine_core::{
  content::SectionContent,
  lock::{LockInfo, LockOutcome},
  section::{
    ContentSection, ContentVersion, SectionStatus, SectionType, SectionUpdate,
    revert_summary,
  },
  store::SectionStore,
};

use crate::{
  Error, Result,
  encode::{
    RawLock, RawSection, RawVersion, SECTION_COLUMNS, VERSION_COLUMNS,
    encode_content, encode_dt, encode_section_type, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Vitrine section store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialised onto the connection's thread, and every multi-statement
/// operation additionally runs in an immediate transaction so other
/// processes sharing the file cannot interleave with it.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Insert the next history row for `section_id` and move the section's
/// `version` counter to it. Must run inside a transaction.
fn append_in_tx(
  tx: &rusqlite::Transaction<'_>,
  section_id: &str,
  content_json: &str,
  created_by: &str,
  change_summary: &str,
  at: &str,
) -> rusqlite::Result<RawVersion> {
  let next: u32 = tx.query_row(
    "SELECT COALESCE(MAX(version_number), 0) + 1
     FROM content_versions WHERE section_id = ?1",
    rusqlite::params![section_id],
    |r| r.get(0),
  )?;

  let version_id = encode_uuid(Uuid::new_v4());
  tx.execute(
    "INSERT INTO content_versions (
       id, section_id, version_number, content_json,
       created_by, created_at, change_summary
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      version_id,
      section_id,
      next,
      content_json,
      created_by,
      at,
      change_summary,
    ],
  )?;
  tx.execute(
    "UPDATE content_sections SET version = ?2 WHERE id = ?1",
    rusqlite::params![section_id, next],
  )?;

  tx.query_row(
    &format!(
      "SELECT {VERSION_COLUMNS}
       FROM content_versions v JOIN content_sections s ON s.id = v.section_id
       WHERE v.id = ?1"
    ),
    rusqlite::params![version_id],
    RawVersion::from_row,
  )
}

fn section_by_id(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawSection>> {
  conn
    .query_row(
      &format!("SELECT {SECTION_COLUMNS} FROM content_sections WHERE id = ?1"),
      rusqlite::params![id],
      RawSection::from_row,
    )
    .optional()
}

fn section_by_type(
  conn: &rusqlite::Connection,
  section_type: &str,
) -> rusqlite::Result<Option<RawSection>> {
  conn
    .query_row(
      &format!(
        "SELECT {SECTION_COLUMNS} FROM content_sections WHERE section_type = ?1"
      ),
      rusqlite::params![section_type],
      RawSection::from_row,
    )
    .optional()
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::debug!(path = %path.as_ref().display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SectionStore impl ───────────────────────────────────────────────────────

impl SectionStore for SqliteStore {
  type Error = Error;

  // ── Sections ──────────────────────────────────────────────────────────────

  async fn get_by_type(
    &self,
    section_type: SectionType,
  ) -> Result<Option<ContentSection>> {
    let key = encode_section_type(section_type);

    let raw = self
      .conn
      .call(move |conn| Ok(section_by_type(conn, key)?))
      .await?;

    raw.map(RawSection::into_section).transpose()
  }

  async fn get_by_id(&self, id: Uuid) -> Result<Option<ContentSection>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(section_by_id(conn, &id_str)?))
      .await?;

    raw.map(RawSection::into_section).transpose()
  }

  async fn get_published_by_type(
    &self,
    section_type: SectionType,
  ) -> Result<Option<ContentSection>> {
    let key = encode_section_type(section_type);
    let published = encode_status(SectionStatus::Published);

    let raw: Option<RawSection> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SECTION_COLUMNS} FROM content_sections
                 WHERE section_type = ?1 AND status = ?2"
              ),
              rusqlite::params![key, published],
              RawSection::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSection::into_section).transpose()
  }

  async fn upsert(
    &self,
    section_type: SectionType,
    update: SectionUpdate,
  ) -> Result<ContentSection> {
    if let Some(content) = &update.content
      && content.section_type() != section_type
    {
      return Err(Error::SectionTypeMismatch {
        expected: section_type,
        found:    content.section_type(),
      });
    }

    let key          = encode_section_type(section_type);
    let content_json = update.content.as_ref().map(encode_content).transpose()?;
    let default_json =
      encode_content(&SectionContent::default_for(section_type))?;
    let status       = update.status.map(encode_status);
    let title        = update.title;
    let actor        = update.actor;
    let new_id       = encode_uuid(Uuid::new_v4());
    let default_title = section_type.default_title();

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = encode_dt(Utc::now());
        let exists = section_by_type(&tx, key)?.is_some();

        if exists {
          tx.execute(
            "UPDATE content_sections SET
               title        = COALESCE(?2, title),
               status       = COALESCE(?3, status),
               content_json = COALESCE(?4, content_json),
               published_at = CASE WHEN ?3 = 'published' THEN ?5 ELSE published_at END,
               updated_at   = ?5
             WHERE section_type = ?1",
            rusqlite::params![key, title, status, content_json, now],
          )?;
        } else {
          tx.execute(
            "INSERT INTO content_sections (
               id, section_type, title, status, content_json,
               created_by, created_at, updated_at, published_at, version
             ) VALUES (
               ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7,
               CASE WHEN ?4 = 'published' THEN ?7 END, 0
             )",
            rusqlite::params![
              new_id,
              key,
              title.unwrap_or_else(|| default_title.to_owned()),
              status.unwrap_or("draft"),
              content_json.unwrap_or(default_json),
              actor,
              now,
            ],
          )?;
        }

        let row = section_by_type(&tx, key)?;
        tx.commit()?;
        Ok(row)
      })
      .await?;

    match raw {
      Some(raw) => raw.into_section(),
      None => Err(Error::Decode(format!("section {key} vanished after upsert"))),
    }
  }

  async fn delete(&self, section_type: SectionType) -> Result<bool> {
    let key = encode_section_type(section_type);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "DELETE FROM content_versions WHERE section_id IN (
             SELECT id FROM content_sections WHERE section_type = ?1
           )",
          rusqlite::params![key],
        )?;
        let n = tx.execute(
          "DELETE FROM content_sections WHERE section_type = ?1",
          rusqlite::params![key],
        )?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }

  async fn list_all(
    &self,
    status: Option<SectionStatus>,
  ) -> Result<Vec<ContentSection>> {
    let status = status.map(encode_status);

    let raws: Vec<RawSection> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SECTION_COLUMNS} FROM content_sections
           WHERE ?1 IS NULL OR status = ?1
           ORDER BY section_type"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status], RawSection::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSection::into_section).collect()
  }

  // ── Locks ─────────────────────────────────────────────────────────────────

  async fn acquire_lock(
    &self,
    section_type: SectionType,
    caller: String,
    now: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> Result<Option<LockOutcome>> {
    let key       = encode_section_type(section_type);
    let now_str   = encode_dt(now);
    let until_str = encode_dt(until);
    let holder_name = caller.clone();

    // (granted, current holder if refused, row exists)
    let (granted, holder, exists): (bool, Option<RawLock>, bool) = self
      .conn
      .call(move |conn| {
        // The whole decision is this one statement.
        let granted = conn.execute(
          "UPDATE content_sections
             SET locked_by = ?2, locked_until = ?3
           WHERE section_type = ?1
             AND (locked_by IS NULL OR locked_until <= ?4 OR locked_by = ?2)",
          rusqlite::params![key, caller, until_str, now_str],
        )? == 1;

        if granted {
          return Ok((true, None, true));
        }

        let current: Option<(Option<String>, Option<String>)> = conn
          .query_row(
            "SELECT locked_by, locked_until FROM content_sections
             WHERE section_type = ?1",
            rusqlite::params![key],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        Ok(match current {
          None => (false, None, false),
          Some((Some(locked_by), Some(locked_until))) => {
            (false, Some(RawLock { locked_by, locked_until }), true)
          }
          Some(_) => (false, None, true),
        })
      })
      .await?;

    if !exists {
      return Ok(None);
    }
    if granted {
      return Ok(Some(LockOutcome::Acquired(LockInfo {
        locked_by:    holder_name,
        locked_until: until,
      })));
    }
    match holder {
      Some(raw) => Ok(Some(LockOutcome::Held(raw.into_lock()?))),
      None => Err(Error::Decode(format!(
        "lock on {key} was refused but no holder is recorded"
      ))),
    }
  }

  async fn release_lock(
    &self,
    section_type: SectionType,
    caller: String,
  ) -> Result<bool> {
    let key = encode_section_type(section_type);

    let released = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE content_sections SET locked_by = NULL, locked_until = NULL
           WHERE section_type = ?1 AND locked_by = ?2",
          rusqlite::params![key, caller],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(released)
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn append_version(
    &self,
    section_id: Uuid,
    content: SectionContent,
    created_by: String,
    change_summary: String,
  ) -> Result<ContentVersion> {
    let id_str       = encode_uuid(section_id);
    let content_json = encode_content(&content)?;

    let raw: Option<RawVersion> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if section_by_id(&tx, &id_str)?.is_none() {
          return Ok(None);
        }
        let now = encode_dt(Utc::now());
        let appended = append_in_tx(
          &tx,
          &id_str,
          &content_json,
          &created_by,
          &change_summary,
          &now,
        )?;
        tx.commit()?;
        Ok(Some(appended))
      })
      .await?;

    raw
      .ok_or(Error::SectionNotFound(section_id))?
      .into_version()
  }

  async fn list_versions(&self, section_id: Uuid) -> Result<Vec<ContentVersion>> {
    let id_str = encode_uuid(section_id);

    let raws: Vec<RawVersion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VERSION_COLUMNS}
           FROM content_versions v JOIN content_sections s ON s.id = v.section_id
           WHERE v.section_id = ?1
           ORDER BY v.version_number DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawVersion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVersion::into_version).collect()
  }

  async fn get_version(
    &self,
    section_id: Uuid,
    version_number: u32,
  ) -> Result<Option<ContentVersion>> {
    let id_str = encode_uuid(section_id);

    let raw: Option<RawVersion> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {VERSION_COLUMNS}
                 FROM content_versions v JOIN content_sections s ON s.id = v.section_id
                 WHERE v.section_id = ?1 AND v.version_number = ?2"
              ),
              rusqlite::params![id_str, version_number],
              RawVersion::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVersion::into_version).transpose()
  }

  async fn publish(
    &self,
    section_type: SectionType,
    caller: String,
    change_summary: String,
  ) -> Result<Option<(ContentSection, ContentVersion)>> {
    let key       = encode_section_type(section_type);
    let published = encode_status(SectionStatus::Published);

    let raw: Option<(RawSection, RawVersion)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(current) = section_by_type(&tx, key)? else {
          return Ok(None);
        };

        let now = encode_dt(Utc::now());
        let appended = append_in_tx(
          &tx,
          &current.id,
          &current.content_json,
          &caller,
          &change_summary,
          &now,
        )?;

        tx.execute(
          "UPDATE content_sections SET
             status            = ?2,
             published_at      = ?3,
             published_version = ?4,
             updated_at        = ?3
           WHERE id = ?1",
          rusqlite::params![
            current.id,
            published,
            now,
            appended.version_number,
          ],
        )?;

        let section = section_by_id(&tx, &current.id)?;
        tx.commit()?;
        Ok(section.map(|s| (s, appended)))
      })
      .await?;

    let Some((section, version)) = raw else {
      return Ok(None);
    };
    Ok(Some((section.into_section()?, version.into_version()?)))
  }

  async fn revert(
    &self,
    section_id: Uuid,
    target: u32,
    caller: String,
  ) -> Result<Option<(ContentSection, ContentVersion)>> {
    let id_str  = encode_uuid(section_id);
    let summary = revert_summary(target);

    let raw: Option<(RawSection, RawVersion)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(current) = section_by_id(&tx, &id_str)? else {
          return Ok(None);
        };
        let target_json: Option<String> = tx
          .query_row(
            "SELECT content_json FROM content_versions
             WHERE section_id = ?1 AND version_number = ?2",
            rusqlite::params![id_str, target],
            |r| r.get(0),
          )
          .optional()?;
        let Some(target_json) = target_json else {
          return Ok(None);
        };

        let now = encode_dt(Utc::now());
        // Keep the pre-revert state recoverable.
        let appended = append_in_tx(
          &tx,
          &id_str,
          &current.content_json,
          &caller,
          &summary,
          &now,
        )?;

        // Reverted content is unpublished until the next publish.
        tx.execute(
          "UPDATE content_sections
           SET content_json = ?2, status = 'draft', updated_at = ?3
           WHERE id = ?1",
          rusqlite::params![id_str, target_json, now],
        )?;

        let section = section_by_id(&tx, &id_str)?;
        tx.commit()?;
        Ok(section.map(|s| (s, appended)))
      })
      .await?;

    let Some((section, snapshot)) = raw else {
      return Ok(None);
    };
    Ok(Some((section.into_section()?, snapshot.into_version()?)))
  }
}
