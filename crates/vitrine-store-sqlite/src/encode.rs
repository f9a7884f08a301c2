//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 UTC strings with
//! microsecond precision. Content is stored as compact JSON of the inner
//! payload. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;
use vitrine_core::{
  content::SectionContent,
  lock::LockInfo,
  migrate,
  section::{ContentSection, ContentVersion, SectionStatus, SectionType},
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Always `YYYY-MM-DDTHH:MM:SS.ffffffZ`, so string order is time order.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── SectionType / SectionStatus ─────────────────────────────────────────────

pub fn encode_section_type(t: SectionType) -> &'static str { t.as_key() }

pub fn decode_section_type(s: &str) -> Result<SectionType> {
  SectionType::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown section type: {s:?}")))
}

pub fn encode_status(s: SectionStatus) -> &'static str {
  match s {
    SectionStatus::Draft => "draft",
    SectionStatus::Published => "published",
  }
}

pub fn decode_status(s: &str) -> Result<SectionStatus> {
  match s {
    "draft" => Ok(SectionStatus::Draft),
    "published" => Ok(SectionStatus::Published),
    other => Err(Error::Decode(format!("unknown status: {other:?}"))),
  }
}

// ─── Content ─────────────────────────────────────────────────────────────────

pub fn encode_content(content: &SectionContent) -> Result<String> {
  Ok(content.to_json()?.to_string())
}

/// Rows written by older editors are migrated on the way out.
pub fn decode_content(
  section_type: SectionType,
  s: &str,
) -> Result<SectionContent> {
  let raw: serde_json::Value = serde_json::from_str(s)?;
  let current = migrate::migrate(section_type, raw);
  Ok(SectionContent::from_parts(section_type, current)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSection::from_row`].
pub const SECTION_COLUMNS: &str = "id, section_type, title, status, content_json,
  created_by, created_at, updated_at, published_at, published_version,
  version, locked_by, locked_until";

/// Raw values read directly from a `content_sections` row.
pub struct RawSection {
  pub id:                String,
  pub section_type:      String,
  pub title:             Option<String>,
  pub status:            String,
  pub content_json:      String,
  pub created_by:        String,
  pub created_at:        String,
  pub updated_at:        String,
  pub published_at:      Option<String>,
  pub published_version: Option<u32>,
  pub version:           u32,
  pub locked_by:         Option<String>,
  pub locked_until:      Option<String>,
}

impl RawSection {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      section_type:      row.get(1)?,
      title:             row.get(2)?,
      status:            row.get(3)?,
      content_json:      row.get(4)?,
      created_by:        row.get(5)?,
      created_at:        row.get(6)?,
      updated_at:        row.get(7)?,
      published_at:      row.get(8)?,
      published_version: row.get(9)?,
      version:           row.get(10)?,
      locked_by:         row.get(11)?,
      locked_until:      row.get(12)?,
    })
  }

  pub fn into_section(self) -> Result<ContentSection> {
    let section_type = decode_section_type(&self.section_type)?;
    Ok(ContentSection {
      id: decode_uuid(&self.id)?,
      section_type,
      title: self.title,
      status: decode_status(&self.status)?,
      content: decode_content(section_type, &self.content_json)?,
      created_by: self.created_by,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      published_at: self.published_at.as_deref().map(decode_dt).transpose()?,
      published_version: self.published_version,
      version: self.version,
      locked_by: self.locked_by,
      locked_until: self.locked_until.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Column list matching [`RawVersion::from_row`]. The section type is joined
/// in so content can be decoded without a second query.
pub const VERSION_COLUMNS: &str = "v.id, v.section_id, s.section_type,
  v.version_number, v.content_json, v.created_by, v.created_at,
  v.change_summary";

/// Raw values read from a `content_versions` row joined with its section.
pub struct RawVersion {
  pub id:             String,
  pub section_id:     String,
  pub section_type:   String,
  pub version_number: u32,
  pub content_json:   String,
  pub created_by:     String,
  pub created_at:     String,
  pub change_summary: String,
}

impl RawVersion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      section_id:     row.get(1)?,
      section_type:   row.get(2)?,
      version_number: row.get(3)?,
      content_json:   row.get(4)?,
      created_by:     row.get(5)?,
      created_at:     row.get(6)?,
      change_summary: row.get(7)?,
    })
  }

  pub fn into_version(self) -> Result<ContentVersion> {
    let section_type = decode_section_type(&self.section_type)?;
    Ok(ContentVersion {
      id:             decode_uuid(&self.id)?,
      section_id:     decode_uuid(&self.section_id)?,
      content:        decode_content(section_type, &self.content_json)?,
      version_number: self.version_number,
      created_by:     self.created_by,
      created_at:     decode_dt(&self.created_at)?,
      change_summary: self.change_summary,
    })
  }
}

/// Lock columns as read back after a refused acquisition.
pub struct RawLock {
  pub locked_by:    String,
  pub locked_until: String,
}

impl RawLock {
  pub fn into_lock(self) -> Result<LockInfo> {
    Ok(LockInfo {
      locked_by:    self.locked_by,
      locked_until: decode_dt(&self.locked_until)?,
    })
  }
}
