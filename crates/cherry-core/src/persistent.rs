//! The storage representation: what repositories read and write.
//!
//! Mirrors [`crate::client`] field for field, except that the content
//! identifier is typed ([`ContentId`]) rather than an opaque string.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use bytes::Bytes;
use uuid::Uuid;

use crate::{
  Error, Result,
  audit::Audit,
  content::ContentId,
  document::{self, DEFAULT_MIME_TYPE, DocumentKind, FileName},
  graph::{self, DocumentNode, OwnerNode, OwnerRef},
  identity::{EntityIdentity, EntityKind},
  mime::MimeDetector,
  status::Status,
};

// ─── BaseEntity ──────────────────────────────────────────────────────────────

/// A stored commerce entity.
#[derive(Debug)]
pub struct BaseEntity {
  id:              Uuid,
  kind:            EntityKind,
  pub name:        Option<String>,
  pub description: Option<String>,
  pub reference:   Option<String>,
  pub audit:       Audit,
  pub status:      Status,
  documents:       Vec<Arc<DocumentEntity>>,
}

impl BaseEntity {
  pub fn new(kind: EntityKind) -> Self { Self::with_id(Uuid::new_v4(), kind) }

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

  pub fn documents(&self) -> &[Arc<DocumentEntity>] { &self.documents }

  /// Assemble this entity with the documents it owns.
  pub fn with_documents(self, documents: Vec<DocumentEntity>) -> Result<Arc<Self>> {
    graph::assemble(self, documents)
  }
}

impl PartialEq for BaseEntity {
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

impl OwnerNode for BaseEntity {
  type Document = DocumentEntity;

  fn identity(&self) -> EntityIdentity { BaseEntity::identity(self) }

  fn documents(&self) -> &[Arc<DocumentEntity>] { &self.documents }

  fn set_documents(&mut self, documents: Vec<Arc<DocumentEntity>>) {
    self.documents = documents;
  }
}

// ─── DocumentEntity ──────────────────────────────────────────────────────────

/// A stored document row. The payload itself lives in a content store.
#[derive(Debug, Clone)]
pub struct DocumentEntity {
  id:                 Uuid,
  pub name:           Option<String>,
  pub description:    Option<String>,
  pub reference:      Option<String>,
  pub audit:          Audit,
  pub status:         Status,
  pub document_type:  DocumentKind,
  pub file_name:      Option<String>,
  pub extension:      Option<String>,
  pub tags:           Option<String>,
  pub mime_type:      String,
  pub content_length: u64,
  pub content_path:   Option<String>,
  pub content_id:     Option<ContentId>,
  owner:              Option<OwnerRef<BaseEntity>>,
  content:            Option<Bytes>,
}

impl DocumentEntity {
  pub fn new(document_type: DocumentKind) -> Self {
    Self::with_id(Uuid::new_v4(), document_type)
  }

  pub fn with_id(id: Uuid, document_type: DocumentKind) -> Self {
    Self {
      id,
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

  pub fn kind(&self) -> EntityKind { EntityKind::Document }

  pub fn identity(&self) -> EntityIdentity { EntityIdentity::new(self.id, EntityKind::Document) }

  pub fn owner(&self) -> Option<&OwnerRef<BaseEntity>> { self.owner.as_ref() }

  pub fn owner_identity(&self) -> Option<EntityIdentity> {
    self.owner.as_ref().map(OwnerRef::identity)
  }

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

  pub fn content(&self) -> Option<&Bytes> { self.content.as_ref() }

  pub fn set_content(&mut self, content: impl Into<Bytes>) { self.content = Some(content.into()); }

  pub fn take_content(&mut self) -> Option<Bytes> { self.content.take() }

  /// Attach the file at `path` as the pending payload, recording its file
  /// name, extension and MIME type.
  pub fn load_content(&mut self, path: &Path, detector: &dyn MimeDetector) -> Result<()> {
    let content = std::fs::read(path).map_err(|e| {
      Error::DocumentContent(format!("cannot read {}: {e}", path.display()))
    })?;
    let file_name = path.to_string_lossy();
    self.mime_type = detector.detect(&content, Some(&file_name));
    self.set_file_name(&file_name);
    self.content_length = content.len() as u64;
    self.content = Some(Bytes::from(content));
    Ok(())
  }

  pub fn output_path(&self, dir: &Path) -> PathBuf {
    let name = self.name.clone().unwrap_or_else(|| self.id.to_string());
    document::output_path(dir, &name, self.extension.as_deref())
  }
}

impl PartialEq for DocumentEntity {
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

impl DocumentNode for DocumentEntity {
  type Owner = BaseEntity;

  fn owner(&self) -> Option<&OwnerRef<BaseEntity>> { self.owner.as_ref() }

  fn set_owner(&mut self, owner: Option<OwnerRef<BaseEntity>>) { self.owner = owner; }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;
  use crate::mime::SignatureDetector;

  #[test]
  fn load_content_reads_file_and_detects_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixel.png");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();

    let mut document = DocumentEntity::new(DocumentKind::Photo);
    document.load_content(&path, &SignatureDetector).unwrap();

    assert_eq!(document.mime_type, "image/png");
    assert_eq!(document.file_name.as_deref(), Some("pixel.png"));
    assert_eq!(document.name.as_deref(), Some("pixel"));
    assert_eq!(document.extension.as_deref(), Some("png"));
    assert_eq!(document.content_length, 16);
    assert!(document.content().is_some());
  }

  #[test]
  fn load_content_of_missing_file_is_a_content_error() {
    let mut document = DocumentEntity::new(DocumentKind::Generic);
    let err = document
      .load_content(Path::new("/definitely/not/here.txt"), &SignatureDetector)
      .unwrap_err();
    assert!(matches!(err, Error::DocumentContent(_)));
    assert_eq!(err.entity_kind(), EntityKind::DocumentContent);
  }

  #[test]
  fn loaded_documents_carry_a_detached_owner() {
    let owner = EntityIdentity::new(Uuid::new_v4(), EntityKind::Employee);
    let document = DocumentEntity::new(DocumentKind::Generic).with_owner(owner);

    assert_eq!(document.owner_identity(), Some(owner));
    assert!(!document.owner().unwrap().is_attached());
  }
}
