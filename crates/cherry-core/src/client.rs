//! The client representation: what callers of the store see.
//!
//! Client values serialise to camelCase JSON. A document's owner serialises
//! as the owner's identity and the transient payload is never serialised.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Result,
  audit::Audit,
  document::{self, DEFAULT_MIME_TYPE, DocumentKind, FileName},
  graph::{self, DocumentNode, OwnerNode, OwnerRef},
  identity::{EntityIdentity, EntityKind},
  status::Status,
};

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A commerce entity (person, customer, shop, ...) as seen by callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
  id:              Uuid,
  #[serde(rename = "entityType")]
  kind:            EntityKind,
  pub name:        Option<String>,
  pub description: Option<String>,
  pub reference:   Option<String>,
  #[serde(flatten)]
  pub audit:       Audit,
  #[serde(flatten)]
  pub status:      Status,
  documents:       Vec<Arc<Document>>,
}

impl Entity {
  /// A new, active entity with a freshly generated identifier.
  pub fn new(kind: EntityKind) -> Self { Self::with_id(Uuid::new_v4(), kind) }

  /// An active entity with a known identifier.
  pub fn with_id(id: Uuid, kind: EntityKind) -> Self {
    Self {
      id,
      kind,
      name: None,
      description: None,
      reference: None,
      audit: Audit::default(),
      status: Status::active(),
      documents: Vec::new(),
    }
  }

  pub fn id(&self) -> Uuid { self.id }

  pub fn kind(&self) -> EntityKind { self.kind }

  pub fn identity(&self) -> EntityIdentity { EntityIdentity::new(self.id, self.kind) }

  pub fn documents(&self) -> &[Arc<Document>] { &self.documents }

  /// Assemble this entity with the documents it owns.
  pub fn with_documents(self, documents: Vec<Document>) -> Result<Arc<Self>> {
    graph::assemble(self, documents)
  }
}

impl PartialEq for Entity {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
      && self.kind == other.kind
      && self.name == other.name
      && self.description == other.description
      && self.reference == other.reference
      && self.audit == other.audit
      && self.status == other.status
  }
}

impl OwnerNode for Entity {
  type Document = Document;

  fn identity(&self) -> EntityIdentity { Entity::identity(self) }

  fn documents(&self) -> &[Arc<Document>] { &self.documents }

  fn set_documents(&mut self, documents: Vec<Arc<Document>>) { self.documents = documents; }
}

// ─── Document ────────────────────────────────────────────────────────────────

/// A document attached to an entity, as seen by callers.
///
/// `content_id` is opaque to callers; it is only set once a payload has been
/// stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
  id:                 Uuid,
  #[serde(rename = "entityType")]
  kind:               EntityKind,
  pub name:           Option<String>,
  pub description:    Option<String>,
  pub reference:      Option<String>,
  #[serde(flatten)]
  pub audit:          Audit,
  #[serde(flatten)]
  pub status:         Status,
  pub document_type:  DocumentKind,
  pub file_name:      Option<String>,
  pub extension:      Option<String>,
  pub tags:           Option<String>,
  pub mime_type:      String,
  pub content_length: u64,
  pub content_path:   Option<String>,
  pub content_id:     Option<String>,
  owner:              Option<OwnerRef<Entity>>,
  #[serde(skip)]
  content:            Option<Bytes>,
}

impl Document {
  pub fn new(document_type: DocumentKind) -> Self { Self::with_id(Uuid::new_v4(), document_type) }

  pub fn with_id(id: Uuid, document_type: DocumentKind) -> Self {
    Self {
      id,
      kind: EntityKind::Document,
      name: None,
      description: None,
      reference: None,
      audit: Audit::default(),
      status: Status::active(),
      document_type,
      file_name: None,
      extension: None,
      tags: None,
      mime_type: DEFAULT_MIME_TYPE.to_owned(),
      content_length: 0,
      content_path: None,
      content_id: None,
      owner: None,
      content: None,
    }
  }

  /// Record `file_name`, deriving the extension and, when unset, the name.
  pub fn with_file_name(mut self, file_name: &str) -> Self {
    self.set_file_name(file_name);
    self
  }

  /// Point this document at an owner known only by identity.
  pub fn with_owner(mut self, owner: EntityIdentity) -> Self {
    self.owner = Some(OwnerRef::detached(owner));
    self
  }

  pub fn id(&self) -> Uuid { self.id }

  pub fn kind(&self) -> EntityKind { self.kind }

  pub fn identity(&self) -> EntityIdentity { EntityIdentity::new(self.id, self.kind) }

  pub fn owner(&self) -> Option<&OwnerRef<Entity>> { self.owner.as_ref() }

  pub fn set_file_name(&mut self, file_name: &str) {
    let Some(parsed) = FileName::parse(file_name) else {
      return;
    };
    if self.name.is_none() {
      self.name = Some(parsed.stem);
    }
    self.extension = parsed.extension;
    self.file_name = Some(parsed.file_name);
  }

  /// The pending payload, if one has been attached and not yet stored.
  pub fn content(&self) -> Option<&Bytes> { self.content.as_ref() }

  pub fn set_content(&mut self, content: impl Into<Bytes>) { self.content = Some(content.into()); }

  pub fn take_content(&mut self) -> Option<Bytes> { self.content.take() }

  /// Where this document is written under `dir`: `dir/<name>.<extension>`.
  pub fn output_path(&self, dir: &Path) -> PathBuf {
    let name = self.name.clone().unwrap_or_else(|| self.id.to_string());
    document::output_path(dir, &name, self.extension.as_deref())
  }
}

impl PartialEq for Document {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
      && self.name == other.name
      && self.description == other.description
      && self.reference == other.reference
      && self.audit == other.audit
      && self.status == other.status
      && self.document_type == other.document_type
      && self.file_name == other.file_name
      && self.extension == other.extension
      && self.tags == other.tags
      && self.mime_type == other.mime_type
      && self.content_length == other.content_length
      && self.content_path == other.content_path
      && self.content_id == other.content_id
      && self.owner == other.owner
  }
}

impl DocumentNode for Document {
  type Owner = Entity;

  fn owner(&self) -> Option<&OwnerRef<Entity>> { self.owner.as_ref() }

  fn set_owner(&mut self, owner: Option<OwnerRef<Entity>>) { self.owner = owner; }
}
