//! Audit metadata carried by every entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who created and last modified an entity, and when.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
  pub created_date:  Option<DateTime<Utc>>,
  pub modified_date: Option<DateTime<Utc>>,
  pub created_by:    Option<String>,
  pub modified_by:   Option<String>,
}

impl Audit {
  /// Record a save by `author` at `at`.
  ///
  /// The creation fields are filled on the first save only.
  pub fn record_save(&mut self, author: &str, at: DateTime<Utc>) {
    if self.created_date.is_none() {
      self.created_date = Some(at);
      self.created_by = Some(author.to_owned());
    }
    self.modified_date = Some(at);
    self.modified_by = Some(author.to_owned());
  }
}
