//! The activation status of an entity.
//!
//! ```text
//! ACTIVE ──deactivate──▶ INACTIVE (since = now)
//!    ▲                      │
//!    └──────activate────────┘ (since cleared)
//! ```
//!
//! `UNSPECIFIED` is the uninitialised sentinel; no transition produces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::identity::deserialize_enum;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum StatusType {
  #[default]
  Unspecified,
  Active,
  Inactive,
}

impl<'de> Deserialize<'de> for StatusType {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserialize_enum(deserializer)
  }
}

/// Status type plus the moment the entity was deactivated.
///
/// `since` is `None` whenever the entity is not inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
  status_type: StatusType,
  since:       Option<DateTime<Utc>>,
}

impl Status {
  /// The status of a freshly created entity.
  pub fn active() -> Self {
    Self {
      status_type: StatusType::Active,
      since:       None,
    }
  }

  /// Rebuild a status exactly as it was stored.
  pub fn restore(status_type: StatusType, since: Option<DateTime<Utc>>) -> Self {
    Self { status_type, since }
  }

  pub fn status_type(&self) -> StatusType { self.status_type }

  pub fn since(&self) -> Option<DateTime<Utc>> { self.since }

  pub fn is_active(&self) -> bool { self.status_type == StatusType::Active }

  pub fn activate(&mut self) {
    self.status_type = StatusType::Active;
    self.since = None;
  }

  pub fn deactivate(&mut self) { self.deactivate_at(Utc::now()) }

  pub fn deactivate_at(&mut self, at: DateTime<Utc>) {
    self.status_type = StatusType::Inactive;
    self.since = Some(at);
  }

  /// Move to `status_type`. Setting the current value again changes nothing;
  /// `INACTIVE` deactivates and every other value activates.
  pub fn set_status_type(&mut self, status_type: StatusType) {
    if status_type == self.status_type && status_type != StatusType::Unspecified {
      return;
    }
    match status_type {
      StatusType::Inactive => self.deactivate(),
      StatusType::Active | StatusType::Unspecified => self.activate(),
    }
  }
}
