//! Services over a [`CommerceStore`] and a [`ContentStore`].
//!
//! The services are the only place where rows and payloads meet: saving a
//! document with a pending payload writes the payload first and records its
//! content identifier on the row; deleting a document removes the payload
//! before the row.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  content::{ContentId, ContentStore},
  identity::EntityKind,
  mime::{MimeDetector, SNIFF_LEN, SignatureDetector},
  persistent::{BaseEntity, DocumentEntity},
  store::CommerceStore,
};

/// Author recorded in audit fields when none is configured.
pub const DEFAULT_AUDITOR: &str = "system";

// ─── Documents ───────────────────────────────────────────────────────────────

pub struct DocumentService<S, C> {
  store:    Arc<S>,
  content:  Arc<C>,
  detector: Arc<dyn MimeDetector>,
  auditor:  String,
}

impl<S, C> DocumentService<S, C>
where
  S: CommerceStore,
  C: ContentStore,
{
  pub fn new(store: Arc<S>, content: Arc<C>) -> Self {
    Self {
      store,
      content,
      detector: Arc::new(SignatureDetector),
      auditor: DEFAULT_AUDITOR.to_owned(),
    }
  }

  pub fn with_detector(mut self, detector: Arc<dyn MimeDetector>) -> Self {
    self.detector = detector;
    self
  }

  /// Name recorded as creator / modifier on every save.
  pub fn with_auditor(mut self, auditor: impl Into<String>) -> Self {
    self.auditor = auditor.into();
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn content_store(&self) -> &C { &self.content }

  pub fn auditor(&self) -> &str { &self.auditor }

  pub async fn count(&self) -> Result<u64> {
    self.store.count_documents().await.map_err(Error::repository)
  }

  pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DocumentEntity>> {
    self.store.find_document(id).await.map_err(Error::repository)
  }

  pub async fn find_all(&self) -> Result<Vec<DocumentEntity>> {
    self.store.find_documents().await.map_err(Error::repository)
  }

  pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<DocumentEntity>> {
    self
      .store
      .find_documents_by_owner(owner_id)
      .await
      .map_err(Error::repository)
  }

  /// Save `document`, storing its pending payload first if it has one.
  /// Every document belongs to an owner; one without is rejected before
  /// anything is written.
  ///
  /// A payload gets a content identifier the first time it is stored and
  /// keeps it on every later replacement. If the row cannot be written, a
  /// payload stored under a new identifier is removed again.
  pub async fn save(&self, mut document: DocumentEntity) -> Result<DocumentEntity> {
    if document.owner().is_none() {
      return Err(Error::InvalidField {
        kind:  EntityKind::Document,
        field: "ownerId",
        value: "null".to_owned(),
      });
    }
    document.audit.record_save(&self.auditor, Utc::now());

    let created = match document.take_content() {
      Some(content) => self.store_content(&mut document, content).await?,
      None => None,
    };

    if let Err(e) = self.store.save_document(&document).await {
      if let Some(content_id) = created {
        warn!(
          document_id = %document.id(),
          %content_id,
          "document row not written, removing its new payload"
        );
        if let Err(cleanup) = self.content.unset(content_id).await {
          warn!(%content_id, error = %cleanup, "orphaned payload left in content store");
        }
      }
      return Err(Error::repository(e));
    }

    info!(
      document_id = %document.id(),
      content_id = ?document.content_id,
      "saved document"
    );
    Ok(document)
  }

  /// Write `content` for `document` and record where it went. Returns the
  /// content id if it was newly assigned.
  async fn store_content(
    &self,
    document: &mut DocumentEntity,
    content: Bytes,
  ) -> Result<Option<ContentId>> {
    let (content_id, created) = match document.content_id {
      Some(id) => (id, false),
      None => (ContentId::generate(), true),
    };

    let head = &content[..content.len().min(SNIFF_LEN)];
    let mime_type = self.detector.detect(head, document.file_name.as_deref());
    let content_length = content.len() as u64;

    self.content.set(content_id, content).await?;
    debug!(%content_id, %mime_type, content_length, "stored payload");

    document.content_id = Some(content_id);
    document.content_length = content_length;
    document.mime_type = mime_type;
    document.content_path = Some(self.content.locate(content_id));
    Ok(created.then_some(content_id))
  }

  /// Delete a document and its payload. Returns `false` if there was no such
  /// document.
  pub async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
    let Some(document) = self.find_by_id(id).await? else {
      return Ok(false);
    };

    if let Some(content_id) = document.content_id
      && !self.content.unset(content_id).await?
    {
      warn!(document_id = %id, %content_id, "payload was already missing");
    }

    let deleted = self.store.delete_document(id).await.map_err(|e| {
      warn!(document_id = %id, "payload removed but document row was not");
      Error::repository(e)
    })?;

    info!(document_id = %id, "deleted document");
    Ok(deleted)
  }

  /// The stored payload of `document`.
  pub async fn get_content(&self, document: &DocumentEntity) -> Result<Bytes> {
    let content_id = document.content_id.ok_or(Error::NoContent(document.id()))?;
    self
      .content
      .get(content_id)
      .await?
      .ok_or(Error::ContentNotFound(content_id))
  }

  pub async fn get_content_by_id(&self, id: Uuid) -> Result<Bytes> {
    let document = self.find_by_id(id).await?.ok_or(Error::NotFound {
      kind: EntityKind::Document,
      id,
    })?;
    self.get_content(&document).await
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// Owner-side operations. Documents are handled through the wrapped
/// [`DocumentService`] so that payloads follow their rows.
pub struct EntityService<S, C> {
  documents: Arc<DocumentService<S, C>>,
}

impl<S, C> EntityService<S, C>
where
  S: CommerceStore,
  C: ContentStore,
{
  pub fn new(documents: Arc<DocumentService<S, C>>) -> Self { Self { documents } }

  pub fn documents(&self) -> &DocumentService<S, C> { &self.documents }

  pub async fn count(&self) -> Result<u64> {
    self.store().count_entities().await.map_err(Error::repository)
  }

  pub async fn find_by_id(&self, id: Uuid) -> Result<Option<BaseEntity>> {
    self.store().find_entity(id).await.map_err(Error::repository)
  }

  pub async fn find_all(&self, kind: Option<EntityKind>) -> Result<Vec<BaseEntity>> {
    self.store().find_entities(kind).await.map_err(Error::repository)
  }

  /// Save the entity row only. Kinds that are not entity rows of their own
  /// are rejected as an invalid `entityType`.
  pub async fn save(&self, mut entity: BaseEntity) -> Result<BaseEntity> {
    let kind = entity.kind();
    if !kind.is_stored_as_entity() {
      return Err(Error::InvalidField {
        kind,
        field: "entityType",
        value: kind.to_string(),
      });
    }
    entity.audit.record_save(self.documents.auditor(), Utc::now());
    self
      .store()
      .save_entity(&entity)
      .await
      .map_err(Error::repository)?;
    info!(entity_id = %entity.id(), kind = %entity.kind(), "saved entity");
    Ok(entity)
  }

  /// Save an entity together with documents it owns, and return the
  /// assembled aggregate.
  pub async fn save_aggregate(
    &self,
    entity: BaseEntity,
    documents: Vec<DocumentEntity>,
  ) -> Result<Arc<BaseEntity>> {
    if !documents.is_empty() && !entity.kind().can_own_documents() {
      return Err(Error::CannotOwnDocuments(entity.kind()));
    }

    let entity = self.save(entity).await?;
    let owner = entity.identity();

    let mut saved = Vec::with_capacity(documents.len());
    for document in documents {
      saved.push(self.documents.save(document.with_owner(owner)).await?);
    }
    entity.with_documents(saved)
  }

  /// Load an entity with all the documents it owns.
  pub async fn load_aggregate(&self, id: Uuid) -> Result<Option<Arc<BaseEntity>>> {
    let Some(entity) = self.find_by_id(id).await? else {
      return Ok(None);
    };
    let documents = if entity.kind().can_own_documents() {
      self.documents.find_by_owner(id).await?
    } else {
      Vec::new()
    };
    entity.with_documents(documents).map(Some)
  }

  /// Delete an entity, its documents and their payloads. Returns `false` if
  /// there was no such entity.
  pub async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
    for document in self.documents.find_by_owner(id).await? {
      self.documents.delete_by_id(document.id()).await?;
    }
    let deleted = self.store().delete_entity(id).await.map_err(Error::repository)?;
    if deleted {
      info!(entity_id = %id, "deleted entity");
    }
    Ok(deleted)
  }

  fn store(&self) -> &S { self.documents.store() }
}
