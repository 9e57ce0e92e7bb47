//! Entity kinds and identities.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use uuid::Uuid;

use crate::{Error, Result};

/// The kind of entity a record represents.
///
/// Parsing is case-insensitive; the canonical spelling is upper snake case
/// (`EMAIL_ADDRESS`).
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum EntityKind {
  #[default]
  Unspecified,
  Media,
  Document,
  DocumentContent,
  Person,
  EmailAddress,
  PostalAddress,
  PhoneNumber,
  Account,
  Customer,
  Organization,
  Company,
  Department,
  Shop,
  Employee,
}

impl EntityKind {
  /// Whether entities of this kind may own documents.
  pub fn can_own_documents(self) -> bool {
    !matches!(
      self,
      Self::Unspecified | Self::Media | Self::Document | Self::DocumentContent
    )
  }

  /// Whether entities of this kind are rows of their own. Documents and
  /// their content live with documents, and `UNSPECIFIED` is never stored.
  pub fn is_stored_as_entity(self) -> bool {
    !matches!(self, Self::Unspecified | Self::Document | Self::DocumentContent)
  }

  /// Parse `value` for `field` of an entity of this kind, reporting failure
  /// as [`Error::InvalidField`].
  pub fn parse_field<T: FromStr>(self, field: &'static str, value: &str) -> Result<T> {
    value.parse().map_err(|_| Error::InvalidField {
      kind: self,
      field,
      value: value.to_owned(),
    })
  }
}

/// Deserialise any spelling [`str::parse`] accepts, listing the possible
/// values on failure.
pub(crate) fn deserialize_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: FromStr + IntoEnumIterator + std::fmt::Display,
{
  let value = String::deserialize(deserializer)?;
  value.parse().map_err(|_| {
    let possible: Vec<String> = T::iter().map(|v| v.to_string()).collect();
    de::Error::custom(format!(
      "unknown value {value:?}, possible values: {}",
      possible.join(", ")
    ))
  })
}

impl<'de> Deserialize<'de> for EntityKind {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserialize_enum(deserializer)
  }
}

/// The identity of an entity: its identifier plus its kind.
///
/// Documents refer to their owner through this pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityIdentity {
  pub id:   Uuid,
  #[serde(rename = "entityType")]
  pub kind: EntityKind,
}

impl EntityIdentity {
  pub fn new(id: Uuid, kind: EntityKind) -> Self { Self { id, kind } }
}
