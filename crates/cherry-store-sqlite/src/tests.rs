//! Integration tests for `SqliteStore` and the services running on top of it,
//! against an in-memory database.

use std::sync::Arc;

use bytes::Bytes;
use cherry_content_fs::FilesystemContentStore;
use cherry_core::{
  Error as CoreError,
  content::{ContentId, ContentStore, InMemoryContentStore},
  document::DocumentKind,
  identity::EntityKind,
  persistent::{BaseEntity, DocumentEntity},
  service::{DocumentService, EntityService},
  status::StatusType,
  store::CommerceStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn services() -> (
  Arc<DocumentService<SqliteStore, InMemoryContentStore>>,
  EntityService<SqliteStore, InMemoryContentStore>,
) {
  let documents = Arc::new(
    DocumentService::new(Arc::new(store().await), Arc::new(InMemoryContentStore::new()))
      .with_auditor("tester"),
  );
  let entities = EntityService::new(documents.clone());
  (documents, entities)
}

/// A new document belonging to a freshly saved customer.
async fn owned<C: ContentStore>(
  documents: &DocumentService<SqliteStore, C>,
  kind: DocumentKind,
) -> DocumentEntity {
  let owner = BaseEntity::new(EntityKind::Customer);
  documents.store().save_entity(&owner).await.unwrap();
  DocumentEntity::new(kind).with_owner(owner.identity())
}

// ─── Entity rows ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_and_find_entity() {
  let s = store().await;
  let mut entity = BaseEntity::new(EntityKind::Customer);
  entity.name = Some("Ada".into());
  entity.reference = Some("C-1".into());
  entity.status.deactivate();

  s.save_entity(&entity).await.unwrap();

  let fetched = s.find_entity(entity.id()).await.unwrap().unwrap();
  assert_eq!(fetched, entity);
  assert_eq!(fetched.status.status_type(), StatusType::Inactive);
}

#[tokio::test]
async fn find_entity_missing_returns_none() {
  let s = store().await;
  assert!(s.find_entity(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn saving_twice_updates_in_place() {
  let s = store().await;
  let mut entity = BaseEntity::new(EntityKind::Shop);
  s.save_entity(&entity).await.unwrap();

  entity.name = Some("Corner Shop".into());
  s.save_entity(&entity).await.unwrap();

  assert_eq!(s.count_entities().await.unwrap(), 1);
  let fetched = s.find_entity(entity.id()).await.unwrap().unwrap();
  assert_eq!(fetched.name.as_deref(), Some("Corner Shop"));
}

#[tokio::test]
async fn find_entities_filtered_by_kind() {
  let s = store().await;
  for kind in [EntityKind::Person, EntityKind::Company, EntityKind::Person] {
    s.save_entity(&BaseEntity::new(kind)).await.unwrap();
  }

  assert_eq!(s.find_entities(None).await.unwrap().len(), 3);
  let people = s.find_entities(Some(EntityKind::Person)).await.unwrap();
  assert_eq!(people.len(), 2);
  assert!(people.iter().all(|e| e.kind() == EntityKind::Person));
}

#[tokio::test]
async fn delete_entity_reports_existence() {
  let s = store().await;
  let entity = BaseEntity::new(EntityKind::Account);
  s.save_entity(&entity).await.unwrap();

  assert!(s.delete_entity(entity.id()).await.unwrap());
  assert!(!s.delete_entity(entity.id()).await.unwrap());
  assert_eq!(s.count_entities().await.unwrap(), 0);
}

// ─── Document rows ───────────────────────────────────────────────────────────

#[tokio::test]
async fn save_and_find_document_with_owner() {
  let s = store().await;
  let owner = BaseEntity::new(EntityKind::Employee);
  s.save_entity(&owner).await.unwrap();

  let mut document = DocumentEntity::new(DocumentKind::Photo)
    .with_file_name("badge.png")
    .with_owner(owner.identity());
  document.content_id = Some(ContentId::generate());
  document.content_length = 4096;
  document.mime_type = "image/png".into();
  document.tags = Some("badge".into());
  s.save_document(&document).await.unwrap();

  let fetched = s.find_document(document.id()).await.unwrap().unwrap();
  assert_eq!(fetched, document);
  assert_eq!(fetched.owner_identity(), Some(owner.identity()));

  let by_owner = s.find_documents_by_owner(owner.id()).await.unwrap();
  assert_eq!(by_owner.len(), 1);
  assert!(s.find_documents_by_owner(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn document_owner_must_exist() {
  let s = store().await;
  let ghost = BaseEntity::new(EntityKind::Person);
  let document = DocumentEntity::new(DocumentKind::Generic).with_owner(ghost.identity());

  assert!(s.save_document(&document).await.is_err());
}

#[tokio::test]
async fn documents_without_an_owner_are_rejected() {
  let s = store().await;

  assert!(s.save_document(&DocumentEntity::new(DocumentKind::Generic)).await.is_err());
  assert_eq!(s.count_documents().await.unwrap(), 0);
}

#[tokio::test]
async fn documents_are_listed_and_counted() {
  let s = store().await;
  let owner = BaseEntity::new(EntityKind::Shop);
  s.save_entity(&owner).await.unwrap();
  for kind in [DocumentKind::Generic, DocumentKind::Icon] {
    let document = DocumentEntity::new(kind).with_owner(owner.identity());
    s.save_document(&document).await.unwrap();
  }

  assert_eq!(s.count_documents().await.unwrap(), 2);
  let all = s.find_documents().await.unwrap();
  assert_eq!(all.len(), 2);
  assert!(all.iter().all(|d| d.owner_identity() == Some(owner.identity())));
}

// ─── Document service ────────────────────────────────────────────────────────

#[tokio::test]
async fn saving_a_payload_assigns_a_content_id() {
  let (documents, _) = services().await;
  let mut document = owned(&documents, DocumentKind::Invoice).await.with_file_name("march.pdf");
  document.set_content(Bytes::from_static(b"%PDF-1.7 invoice body"));

  let saved = documents.save(document).await.unwrap();

  let content_id = saved.content_id.expect("content id assigned");
  assert!(saved.content().is_none());
  assert_eq!(saved.content_length, 21);
  assert_eq!(saved.mime_type, "application/pdf");
  assert_eq!(saved.content_path, Some(format!("/{content_id}")));
  assert_eq!(saved.audit.created_by.as_deref(), Some("tester"));
  assert!(documents.content_store().exists(content_id).await.unwrap());

  let stored = documents.find_by_id(saved.id()).await.unwrap().unwrap();
  assert_eq!(stored, saved);
}

#[tokio::test]
async fn saving_without_payload_leaves_content_alone() {
  let (documents, _) = services().await;

  let saved = documents.save(owned(&documents, DocumentKind::Generic).await).await.unwrap();

  assert_eq!(saved.content_id, None);
  assert_eq!(saved.content_length, 0);
  assert!(documents.content_store().is_empty());
}

#[tokio::test]
async fn replacing_a_payload_keeps_the_content_id() {
  let (documents, _) = services().await;
  let mut document = owned(&documents, DocumentKind::Generic).await;
  document.set_content(Bytes::from_static(b"first draft"));
  let mut saved = documents.save(document).await.unwrap();
  let content_id = saved.content_id.unwrap();

  saved.set_content(Bytes::from_static(b"second, much longer draft"));
  let replaced = documents.save(saved).await.unwrap();

  assert_eq!(replaced.content_id, Some(content_id));
  assert_eq!(replaced.content_length, 25);
  assert_eq!(documents.content_store().len(), 1);
  let content = documents.get_content_by_id(replaced.id()).await.unwrap();
  assert_eq!(content, Bytes::from_static(b"second, much longer draft"));
}

#[tokio::test]
async fn metadata_updates_keep_the_content_id() {
  let (documents, _) = services().await;
  let mut document = owned(&documents, DocumentKind::Generic).await;
  document.set_content(Bytes::from_static(b"payload"));
  let mut saved = documents.save(document).await.unwrap();
  let content_id = saved.content_id;

  saved.description = Some("updated".into());
  let updated = documents.save(saved).await.unwrap();

  assert_eq!(updated.content_id, content_id);
  assert_eq!(updated.content_length, 7);
}

#[tokio::test]
async fn deleting_a_document_removes_its_payload() {
  let (documents, _) = services().await;
  let mut document = owned(&documents, DocumentKind::Generic).await;
  document.set_content(Bytes::from_static(b"to be deleted"));
  let saved = documents.save(document).await.unwrap();
  let content_id = saved.content_id.unwrap();

  assert!(documents.delete_by_id(saved.id()).await.unwrap());

  assert!(!documents.content_store().exists(content_id).await.unwrap());
  assert!(documents.find_by_id(saved.id()).await.unwrap().is_none());
  assert!(!documents.delete_by_id(saved.id()).await.unwrap());
}

#[tokio::test]
async fn failed_row_write_removes_new_payload() {
  let (documents, _) = services().await;
  let ghost = BaseEntity::new(EntityKind::Person);
  let mut document = DocumentEntity::new(DocumentKind::Generic).with_owner(ghost.identity());
  document.set_content(Bytes::from_static(b"orphan"));

  let err = documents.save(document).await.unwrap_err();

  assert!(matches!(err, CoreError::Repository(_)));
  assert!(documents.content_store().is_empty());
}

#[tokio::test]
async fn ownerless_documents_are_refused_before_any_write() {
  let (documents, _) = services().await;
  let mut document = DocumentEntity::new(DocumentKind::Generic);
  document.set_content(Bytes::from_static(b"nobody's"));

  let err = documents.save(document).await.unwrap_err();

  assert!(matches!(err, CoreError::InvalidField { field: "ownerId", .. }));
  assert!(documents.content_store().is_empty());
  assert_eq!(documents.count().await.unwrap(), 0);
}

#[tokio::test]
async fn content_errors_are_distinguished() {
  let (documents, _) = services().await;

  let missing = Uuid::new_v4();
  let err = documents.get_content_by_id(missing).await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound { kind: EntityKind::Document, id } if id == missing));

  let empty = documents.save(owned(&documents, DocumentKind::Generic).await).await.unwrap();
  let err = documents.get_content(&empty).await.unwrap_err();
  assert!(matches!(err, CoreError::NoContent(id) if id == empty.id()));

  let mut dangling = empty.clone();
  let content_id = ContentId::generate();
  dangling.content_id = Some(content_id);
  let err = documents.get_content(&dangling).await.unwrap_err();
  assert!(matches!(err, CoreError::ContentNotFound(id) if id == content_id));
}

#[tokio::test]
async fn counts_and_lists_documents() {
  let (documents, _) = services().await;
  for _ in 0..3 {
    documents.save(owned(&documents, DocumentKind::Photo).await).await.unwrap();
  }

  assert_eq!(documents.count().await.unwrap(), 3);
  assert_eq!(documents.find_all().await.unwrap().len(), 3);
}

// ─── Entity service ──────────────────────────────────────────────────────────

#[tokio::test]
async fn aggregates_round_trip_through_the_store() {
  let (documents, entities) = services().await;
  let mut invoice = DocumentEntity::new(DocumentKind::Invoice).with_file_name("q1.pdf");
  invoice.set_content(Bytes::from_static(b"%PDF-1.4 q1"));
  let photo = DocumentEntity::new(DocumentKind::Photo);

  let saved = entities
    .save_aggregate(BaseEntity::new(EntityKind::Company), vec![invoice, photo])
    .await
    .unwrap();
  assert_eq!(saved.documents().len(), 2);

  let loaded = entities.load_aggregate(saved.id()).await.unwrap().unwrap();
  assert_eq!(*loaded, *saved);
  assert_eq!(loaded.documents().len(), 2);
  for document in loaded.documents() {
    assert!(Arc::ptr_eq(&document.owner().unwrap().upgrade().unwrap(), &loaded));
  }
  assert_eq!(documents.find_by_owner(saved.id()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn document_kinds_cannot_hold_documents() {
  let (_, entities) = services().await;

  let err = entities
    .save_aggregate(
      BaseEntity::new(EntityKind::Media),
      vec![DocumentEntity::new(DocumentKind::Generic)],
    )
    .await
    .unwrap_err();

  assert!(matches!(err, CoreError::CannotOwnDocuments(EntityKind::Media)));
  assert_eq!(entities.count().await.unwrap(), 0);
}

#[tokio::test]
async fn deleting_an_entity_cascades_to_documents_and_payloads() {
  let (documents, entities) = services().await;
  let mut contract = DocumentEntity::new(DocumentKind::Generic);
  contract.set_content(Bytes::from_static(b"terms"));
  let owner = entities
    .save_aggregate(BaseEntity::new(EntityKind::Customer), vec![contract])
    .await
    .unwrap();

  assert!(entities.delete_by_id(owner.id()).await.unwrap());

  assert_eq!(documents.count().await.unwrap(), 0);
  assert!(documents.content_store().is_empty());
  assert!(entities.load_aggregate(owner.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn document_kinds_are_not_saved_as_entities() {
  let (_, entities) = services().await;

  for kind in [EntityKind::Document, EntityKind::DocumentContent, EntityKind::Unspecified] {
    let err = entities.save(BaseEntity::new(kind)).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidField { field: "entityType", .. }));
  }
  assert_eq!(entities.count().await.unwrap(), 0);
}

#[tokio::test]
async fn entity_audit_is_stamped_on_save() {
  let (_, entities) = services().await;

  let saved = entities.save(BaseEntity::new(EntityKind::Person)).await.unwrap();
  let created = saved.audit.created_date;
  let resaved = entities.save(saved).await.unwrap();

  assert_eq!(resaved.audit.created_date, created);
  assert_eq!(resaved.audit.modified_by.as_deref(), Some("tester"));
  assert!(resaved.audit.modified_date >= created);
  assert_eq!(entities.find_all(Some(EntityKind::Person)).await.unwrap().len(), 1);
}

// ─── Filesystem content ──────────────────────────────────────────────────────

#[tokio::test]
async fn payloads_land_in_the_filesystem_store() {
  let dir = tempfile::tempdir().unwrap();
  let content = FilesystemContentStore::open(dir.path().join("content")).await.unwrap();
  let documents = DocumentService::new(Arc::new(store().await), Arc::new(content));

  let mut document = owned(&documents, DocumentKind::Photo).await.with_file_name("dot.gif");
  document.set_content(Bytes::from_static(b"GIF89a\x01\x00\x01\x00"));
  let saved = documents.save(document).await.unwrap();
  let content_id = saved.content_id.unwrap();

  let on_disk = dir.path().join("content").join(content_id.to_string());
  assert!(on_disk.exists());
  assert_eq!(saved.mime_type, "image/gif");

  documents.delete_by_id(saved.id()).await.unwrap();
  assert!(!on_disk.exists());
}
