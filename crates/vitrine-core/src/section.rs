//! Content sections and their version history records.
//!
//! A section is the single live row for one [`SectionType`]. Every publish or
//! revert appends an immutable [`ContentVersion`]; the section's `version`
//! counter always equals the highest version number in its history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{content::SectionContent, lock::LockInfo};

// ─── Section type ────────────────────────────────────────────────────────────

/// The closed set of website sections managed by the store.
///
/// The kebab-case string form is the storage key and the URL segment.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SectionType {
  About,
  Cta,
  #[serde(alias = "digital_partners")]
  #[strum(to_string = "digital-partners", serialize = "digital_partners")]
  DigitalPartners,
  Footer,
  Hero,
  #[serde(alias = "marquee_clients")]
  #[strum(to_string = "marquee-clients", serialize = "marquee_clients")]
  MarqueeClients,
  Navbar,
  Portfolio,
  Services,
}

impl SectionType {
  /// The key stored in the `section_type` column.
  pub fn as_key(&self) -> &'static str {
    match self {
      Self::About => "about",
      Self::Cta => "cta",
      Self::DigitalPartners => "digital-partners",
      Self::Footer => "footer",
      Self::Hero => "hero",
      Self::MarqueeClients => "marquee-clients",
      Self::Navbar => "navbar",
      Self::Portfolio => "portfolio",
      Self::Services => "services",
    }
  }

  /// Display label given to a section row created without a title.
  pub fn default_title(&self) -> &'static str {
    match self {
      Self::About => "About",
      Self::Cta => "Call to Action",
      Self::DigitalPartners => "Digital Partners",
      Self::Footer => "Footer",
      Self::Hero => "Hero",
      Self::MarqueeClients => "Clients Marquee",
      Self::Navbar => "Navigation",
      Self::Portfolio => "Portfolio",
      Self::Services => "Services",
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
  #[default]
  Draft,
  Published,
}

// ─── Section ─────────────────────────────────────────────────────────────────

/// The live row for one section type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSection {
  pub id:                Uuid,
  pub section_type:      SectionType,
  pub title:             Option<String>,
  pub status:            SectionStatus,
  pub content:           SectionContent,
  pub created_by:        String,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
  /// `None` means the section has never been published.
  pub published_at:      Option<DateTime<Utc>>,
  /// The history entry recorded by the most recent publish.
  pub published_version: Option<u32>,
  /// Zero until the first history entry is appended.
  pub version:           u32,
  pub locked_by:         Option<String>,
  pub locked_until:      Option<DateTime<Utc>>,
}

impl ContentSection {
  /// The lock currently held on this section, if it has not expired at `now`.
  pub fn active_lock(&self, now: DateTime<Utc>) -> Option<LockInfo> {
    match (&self.locked_by, self.locked_until) {
      (Some(by), Some(until)) if now < until => Some(LockInfo {
        locked_by:    by.clone(),
        locked_until: until,
      }),
      _ => None,
    }
  }
}

/// Field changes accepted by [`crate::store::SectionStore::upsert`].
///
/// `None` fields are left untouched on an existing row; on a new row the
/// content falls back to the registry default and the title to
/// [`SectionType::default_title`].
#[derive(Debug, Clone)]
pub struct SectionUpdate {
  pub title:   Option<String>,
  pub status:  Option<SectionStatus>,
  pub content: Option<SectionContent>,
  /// Recorded as `created_by` when the row is created.
  pub actor:   String,
}

impl SectionUpdate {
  pub fn new(actor: impl Into<String>) -> Self {
    Self { title: None, status: None, content: None, actor: actor.into() }
  }

  pub fn with_content(mut self, content: SectionContent) -> Self {
    self.content = Some(content);
    self
  }

  pub fn with_status(mut self, status: SectionStatus) -> Self {
    self.status = Some(status);
    self
  }

  pub fn with_title(mut self, title: Option<String>) -> Self {
    self.title = title;
    self
  }
}

// ─── Version history ─────────────────────────────────────────────────────────

/// An immutable snapshot of a section's content. Never updated once written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVersion {
  pub id:             Uuid,
  pub section_id:     Uuid,
  pub content:        SectionContent,
  /// Starts at 1 and increases by exactly one per section.
  pub version_number: u32,
  pub created_by:     String,
  pub created_at:     DateTime<Utc>,
  pub change_summary: String,
}

/// Change summary recorded by a publish.
pub const PUBLISH_SUMMARY: &str = "Published changes";

/// Change summary for the snapshot taken right before a revert.
pub fn revert_summary(target: u32) -> String {
  format!("Snapshot before revert to version {target}")
}
