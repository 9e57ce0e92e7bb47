//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings and enums by their upper snake case names.

use chrono::{DateTime, Utc};
use cherry_core::{
  audit::Audit,
  document::DocumentKind,
  identity::{EntityIdentity, EntityKind},
  persistent::{BaseEntity, DocumentEntity},
  status::{Status, StatusType},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Shared columns ──────────────────────────────────────────────────────────

/// Columns every entity row carries.
pub struct RawCommon {
  pub name:          Option<String>,
  pub description:   Option<String>,
  pub reference:     Option<String>,
  pub status_type:   String,
  pub status_since:  Option<String>,
  pub created_date:  Option<String>,
  pub modified_date: Option<String>,
  pub created_by:    Option<String>,
  pub modified_by:   Option<String>,
}

impl RawCommon {
  fn encode(
    name: &Option<String>,
    description: &Option<String>,
    reference: &Option<String>,
    audit: &Audit,
    status: &Status,
  ) -> Self {
    Self {
      name:          name.clone(),
      description:   description.clone(),
      reference:     reference.clone(),
      status_type:   status.status_type().to_string(),
      status_since:  status.since().map(encode_dt),
      created_date:  audit.created_date.map(encode_dt),
      modified_date: audit.modified_date.map(encode_dt),
      created_by:    audit.created_by.clone(),
      modified_by:   audit.modified_by.clone(),
    }
  }

  /// Read the common columns starting at column `at`.
  fn from_row(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      name:          row.get(at)?,
      description:   row.get(at + 1)?,
      reference:     row.get(at + 2)?,
      status_type:   row.get(at + 3)?,
      status_since:  row.get(at + 4)?,
      created_date:  row.get(at + 5)?,
      modified_date: row.get(at + 6)?,
      created_by:    row.get(at + 7)?,
      modified_by:   row.get(at + 8)?,
    })
  }

  fn decode(&self, kind: EntityKind) -> Result<(Audit, Status)> {
    let status_type: StatusType = kind.parse_field("status_type", &self.status_type)?;
    let status = Status::restore(status_type, decode_opt_dt(self.status_since.as_deref())?);
    let audit = Audit {
      created_date:  decode_opt_dt(self.created_date.as_deref())?,
      modified_date: decode_opt_dt(self.modified_date.as_deref())?,
      created_by:    self.created_by.clone(),
      modified_by:   self.modified_by.clone(),
    };
    Ok((audit, status))
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// Raw strings of an `entities` row.
pub struct RawEntity {
  pub id:          String,
  pub entity_type: String,
  pub common:      RawCommon,
}

impl RawEntity {
  pub fn encode(entity: &BaseEntity) -> Self {
    Self {
      id:          encode_uuid(entity.id()),
      entity_type: entity.kind().to_string(),
      common:      RawCommon::encode(
        &entity.name,
        &entity.description,
        &entity.reference,
        &entity.audit,
        &entity.status,
      ),
    }
  }

  /// Read a row selected with `ENTITY_COLUMNS`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      entity_type: row.get(1)?,
      common:      RawCommon::from_row(row, 2)?,
    })
  }

  pub fn into_entity(self) -> Result<BaseEntity> {
    let kind: EntityKind = EntityKind::Unspecified.parse_field("entity_type", &self.entity_type)?;
    let (audit, status) = self.common.decode(kind)?;

    let mut entity = BaseEntity::with_id(decode_uuid(&self.id)?, kind);
    entity.name = self.common.name;
    entity.description = self.common.description;
    entity.reference = self.common.reference;
    entity.audit = audit;
    entity.status = status;
    Ok(entity)
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// Raw values of a `documents` row.
pub struct RawDocument {
  pub id:             String,
  pub common:         RawCommon,
  pub document_type:  String,
  pub file_name:      Option<String>,
  pub extension:      Option<String>,
  pub tags:           Option<String>,
  pub mime_type:      String,
  pub content_length: i64,
  pub content_path:   Option<String>,
  pub content_id:     Option<String>,
  pub owner_id:       Option<String>,
  pub owner_type:     Option<String>,
}

impl RawDocument {
  pub fn encode(document: &DocumentEntity) -> Result<Self> {
    let owner = document.owner_identity();
    Ok(Self {
      id:             encode_uuid(document.id()),
      common:         RawCommon::encode(
        &document.name,
        &document.description,
        &document.reference,
        &document.audit,
        &document.status,
      ),
      document_type:  document.document_type.to_string(),
      file_name:      document.file_name.clone(),
      extension:      document.extension.clone(),
      tags:           document.tags.clone(),
      mime_type:      document.mime_type.clone(),
      content_length: i64::try_from(document.content_length)
        .map_err(|_| Error::OutOfRange("content_length"))?,
      content_path:   document.content_path.clone(),
      content_id:     document.content_id.map(|id| id.to_string()),
      owner_id:       owner.map(|o| encode_uuid(o.id)),
      owner_type:     owner.map(|o| o.kind.to_string()),
    })
  }

  /// Read a row selected with `DOCUMENT_COLUMNS`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      common:         RawCommon::from_row(row, 1)?,
      document_type:  row.get(10)?,
      file_name:      row.get(11)?,
      extension:      row.get(12)?,
      tags:           row.get(13)?,
      mime_type:      row.get(14)?,
      content_length: row.get(15)?,
      content_path:   row.get(16)?,
      content_id:     row.get(17)?,
      owner_id:       row.get(18)?,
      owner_type:     row.get(19)?,
    })
  }

  pub fn into_document(self) -> Result<DocumentEntity> {
    let kind = EntityKind::Document;
    let document_type: DocumentKind = kind.parse_field("document_type", &self.document_type)?;
    let content_id = self
      .content_id
      .as_deref()
      .map(|s| kind.parse_field("content_id", s))
      .transpose()?;
    let content_length =
      u64::try_from(self.content_length).map_err(|_| Error::OutOfRange("content_length"))?;
    let owner = match (self.owner_id.as_deref(), self.owner_type.as_deref()) {
      (Some(id), Some(owner_type)) => Some(EntityIdentity::new(
        decode_uuid(id)?,
        kind.parse_field("owner_type", owner_type)?,
      )),
      _ => None,
    };

    let (audit, status) = self.common.decode(kind)?;

    let mut document = DocumentEntity::with_id(decode_uuid(&self.id)?, document_type);
    if let Some(owner) = owner {
      document = document.with_owner(owner);
    }
    document.name = self.common.name;
    document.description = self.common.description;
    document.reference = self.common.reference;
    document.audit = audit;
    document.status = status;
    document.file_name = self.file_name;
    document.extension = self.extension;
    document.tags = self.tags;
    document.mime_type = self.mime_type;
    document.content_length = content_length;
    document.content_path = self.content_path;
    document.content_id = content_id;
    Ok(document)
  }
}
