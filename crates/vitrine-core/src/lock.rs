//! Advisory per-section locks and the time source they are measured against.

use std::{collections::BTreeSet, sync::Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ─── Lock records ────────────────────────────────────────────────────────────

/// Who holds a section and until when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockInfo {
  pub locked_by:    String,
  pub locked_until: DateTime<Utc>,
}

/// Result of a single conditional lock write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
  /// The caller now holds the lock.
  Acquired(LockInfo),
  /// Another caller holds an unexpired lock.
  Held(LockInfo),
}

// ─── Override policy ─────────────────────────────────────────────────────────

/// Caller ids that may edit a section regardless of who holds its lock.
///
/// Empty unless configured; there is no built-in bypass identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockOverride {
  callers: BTreeSet<String>,
}

impl LockOverride {
  pub fn disabled() -> Self { Self::default() }

  pub fn for_callers<I, T>(callers: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    Self { callers: callers.into_iter().map(Into::into).collect() }
  }

  pub fn allows(&self, caller: &str) -> bool { self.callers.contains(caller) }

  pub fn is_enabled(&self) -> bool { !self.callers.is_empty() }

  pub fn callers(&self) -> impl Iterator<Item = &str> {
    self.callers.iter().map(String::as_str)
  }
}

/// Whether `caller` may submit changes to a section whose active lock (if
/// any) is `lock`.
pub fn can_edit(
  lock: Option<&LockInfo>,
  caller: Option<&str>,
  policy: &LockOverride,
) -> bool {
  match (lock, caller) {
    (None, _) => true,
    (Some(_), Some(c)) if policy.allows(c) => true,
    (Some(l), Some(c)) => l.locked_by == c,
    (Some(_), None) => false,
  }
}

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of "now" for lock expiry decisions.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self { Self { now: Mutex::new(start) } }

  pub fn advance(&self, by: Duration) {
    let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
    *now += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
  fn now(&self) -> DateTime<Utc> { (**self).now() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn held_by(who: &str) -> LockInfo {
    LockInfo {
      locked_by:    who.to_owned(),
      locked_until: Utc::now() + Duration::minutes(5),
    }
  }

  #[test]
  fn unlocked_section_is_editable_by_anyone() {
    let policy = LockOverride::disabled();
    assert!(can_edit(None, Some("alice"), &policy));
    assert!(can_edit(None, None, &policy));
  }

  #[test]
  fn lock_holder_can_edit_others_cannot() {
    let policy = LockOverride::disabled();
    let lock = held_by("alice");
    assert!(can_edit(Some(&lock), Some("alice"), &policy));
    assert!(!can_edit(Some(&lock), Some("bob"), &policy));
    assert!(!can_edit(Some(&lock), None, &policy));
  }

  #[test]
  fn override_callers_edit_through_locks() {
    let policy = LockOverride::for_callers(["ops"]);
    let lock = held_by("alice");
    assert!(can_edit(Some(&lock), Some("ops"), &policy));
    assert!(!can_edit(Some(&lock), Some("bob"), &policy));
    assert!(policy.is_enabled());
    assert!(!LockOverride::disabled().is_enabled());
  }

  #[test]
  fn manual_clock_advances() {
    let start = Utc::now();
    let clock = ManualClock::new(start);
    clock.advance(Duration::minutes(6));
    assert_eq!(clock.now(), start + Duration::minutes(6));
  }
}
