//! The `CommerceStore` trait.
//!
//! Implemented by relational backends (e.g. `cherry-store-sqlite`). Services
//! and the HTTP layer depend on this abstraction, not on a concrete backend.
//! Backends store rows only; payloads go to a [`crate::content::ContentStore`].

use std::future::Future;

use uuid::Uuid;

use crate::{
  identity::EntityKind,
  persistent::{BaseEntity, DocumentEntity},
};

/// Abstraction over the relational store of entity and document rows.
///
/// Saves are upserts keyed by identifier. A stored document records its
/// owner's identity; documents are never stored inline with their owner.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CommerceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Entities ──────────────────────────────────────────────────────────

  fn save_entity<'a>(
    &'a self,
    entity: &'a BaseEntity,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Retrieve an entity row by id. Documents are not loaded.
  fn find_entity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<BaseEntity>, Self::Error>> + Send + '_;

  /// List entity rows, optionally restricted to one kind.
  fn find_entities(
    &self,
    kind: Option<EntityKind>,
  ) -> impl Future<Output = Result<Vec<BaseEntity>, Self::Error>> + Send + '_;

  /// Delete an entity row. Returns `false` if it did not exist.
  fn delete_entity(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_entities(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Documents ─────────────────────────────────────────────────────────

  fn save_document<'a>(
    &'a self,
    document: &'a DocumentEntity,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn find_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DocumentEntity>, Self::Error>> + Send + '_;

  fn find_documents(
    &self,
  ) -> impl Future<Output = Result<Vec<DocumentEntity>, Self::Error>> + Send + '_;

  fn find_documents_by_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<DocumentEntity>, Self::Error>> + Send + '_;

  /// Delete a document row. Returns `false` if it did not exist.
  fn delete_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_documents(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
