//! Scalar field copying for each conversion direction.
//!
//! Only plain fields are copied here. Owned documents and owner links are the
//! graph walker's job, and a pending payload is never carried over.

use crate::{
  Result,
  client::{Document, Entity},
  content::ContentId,
  graph::{DocumentNode, OwnerNode},
  identity::EntityKind,
  persistent::{BaseEntity, DocumentEntity},
};

/// One conversion direction: which node types go in, which come out, and
/// how their scalar fields are carried across.
pub trait Direction: 'static {
  type SourceOwner: OwnerNode<Document = Self::SourceDocument>;
  type SourceDocument: DocumentNode<Owner = Self::SourceOwner>;
  type TargetOwner: OwnerNode<Document = Self::TargetDocument>;
  type TargetDocument: DocumentNode<Owner = Self::TargetOwner>;

  fn copy_owner(source: &Self::SourceOwner) -> Result<Self::TargetOwner>;

  fn copy_document(source: &Self::SourceDocument) -> Result<Self::TargetDocument>;
}

/// Storage to client.
#[derive(Debug)]
pub struct PersistentToClient;

/// Client to storage.
#[derive(Debug)]
pub struct ClientToPersistent;

/// Client to client.
#[derive(Debug)]
pub struct ClientCopy;

/// Storage to storage.
#[derive(Debug)]
pub struct PersistentCopy;

macro_rules! copy_common {
  ($source:expr, $target:expr) => {{
    $target.name = $source.name.clone();
    $target.description = $source.description.clone();
    $target.reference = $source.reference.clone();
    $target.audit = $source.audit.clone();
    $target.status = $source.status.clone();
  }};
}

macro_rules! copy_document {
  ($source:expr, $target:expr) => {{
    copy_common!($source, $target);
    $target.file_name = $source.file_name.clone();
    $target.extension = $source.extension.clone();
    $target.tags = $source.tags.clone();
    $target.mime_type = $source.mime_type.clone();
    $target.content_length = $source.content_length;
    $target.content_path = $source.content_path.clone();
  }};
}

fn parse_content_id(value: Option<&str>) -> Result<Option<ContentId>> {
  value
    .map(|v| EntityKind::Document.parse_field("contentId", v))
    .transpose()
}

impl Direction for PersistentToClient {
  type SourceOwner = BaseEntity;
  type SourceDocument = DocumentEntity;
  type TargetOwner = Entity;
  type TargetDocument = Document;

  fn copy_owner(source: &BaseEntity) -> Result<Entity> {
    let mut target = Entity::with_id(source.id(), source.kind());
    copy_common!(source, target);
    Ok(target)
  }

  fn copy_document(source: &DocumentEntity) -> Result<Document> {
    let mut target = Document::with_id(source.id(), source.document_type);
    copy_document!(source, target);
    target.content_id = source.content_id.map(|id| id.to_string());
    Ok(target)
  }
}

impl Direction for ClientToPersistent {
  type SourceOwner = Entity;
  type SourceDocument = Document;
  type TargetOwner = BaseEntity;
  type TargetDocument = DocumentEntity;

  fn copy_owner(source: &Entity) -> Result<BaseEntity> {
    let mut target = BaseEntity::with_id(source.id(), source.kind());
    copy_common!(source, target);
    Ok(target)
  }

  fn copy_document(source: &Document) -> Result<DocumentEntity> {
    let mut target = DocumentEntity::with_id(source.id(), source.document_type);
    copy_document!(source, target);
    target.content_id = parse_content_id(source.content_id.as_deref())?;
    Ok(target)
  }
}

impl Direction for ClientCopy {
  type SourceOwner = Entity;
  type SourceDocument = Document;
  type TargetOwner = Entity;
  type TargetDocument = Document;

  fn copy_owner(source: &Entity) -> Result<Entity> {
    let mut target = Entity::with_id(source.id(), source.kind());
    copy_common!(source, target);
    Ok(target)
  }

  fn copy_document(source: &Document) -> Result<Document> {
    let mut target = Document::with_id(source.id(), source.document_type);
    copy_document!(source, target);
    target.content_id = source.content_id.clone();
    Ok(target)
  }
}

impl Direction for PersistentCopy {
  type SourceOwner = BaseEntity;
  type SourceDocument = DocumentEntity;
  type TargetOwner = BaseEntity;
  type TargetDocument = DocumentEntity;

  fn copy_owner(source: &BaseEntity) -> Result<BaseEntity> {
    let mut target = BaseEntity::with_id(source.id(), source.kind());
    copy_common!(source, target);
    Ok(target)
  }

  fn copy_document(source: &DocumentEntity) -> Result<DocumentEntity> {
    let mut target = DocumentEntity::with_id(source.id(), source.document_type);
    copy_document!(source, target);
    target.content_id = source.content_id;
    Ok(target)
  }
}
