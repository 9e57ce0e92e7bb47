//! Owner/document links shared by both representations.
//!
//! An owner holds its documents (`Arc`); a document points back at its owner
//! through an [`OwnerRef`], which never keeps the owner alive. The link is set
//! when the aggregate is assembled and is not changed afterwards. A document
//! loaded on its own carries a detached reference: the owner's identity
//! without a live pointer.

use std::{
  fmt,
  sync::{Arc, Weak},
};

use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::{
  Error, Result,
  identity::{EntityIdentity, EntityKind},
};

// ─── OwnerRef ────────────────────────────────────────────────────────────────

/// A non-owning back-reference from a document to its owner.
pub struct OwnerRef<E> {
  identity: EntityIdentity,
  entity:   Weak<E>,
}

impl<E> OwnerRef<E> {
  pub fn attached(identity: EntityIdentity, entity: Weak<E>) -> Self {
    Self { identity, entity }
  }

  /// A reference carrying only the owner's identity.
  pub fn detached(identity: EntityIdentity) -> Self {
    Self {
      identity,
      entity: Weak::new(),
    }
  }

  pub fn identity(&self) -> EntityIdentity { self.identity }

  pub fn id(&self) -> Uuid { self.identity.id }

  pub fn kind(&self) -> EntityKind { self.identity.kind }

  /// The owner, if it is still alive.
  pub fn upgrade(&self) -> Option<Arc<E>> { self.entity.upgrade() }

  pub fn is_attached(&self) -> bool { self.entity.strong_count() > 0 }
}

impl<E> Clone for OwnerRef<E> {
  fn clone(&self) -> Self {
    Self {
      identity: self.identity,
      entity:   self.entity.clone(),
    }
  }
}

impl<E> fmt::Debug for OwnerRef<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OwnerRef")
      .field("identity", &self.identity)
      .field("attached", &self.is_attached())
      .finish()
  }
}

impl<E> PartialEq for OwnerRef<E> {
  fn eq(&self, other: &Self) -> bool { self.identity == other.identity }
}

impl<E> Serialize for OwnerRef<E> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.identity.serialize(serializer)
  }
}

// ─── Node traits ─────────────────────────────────────────────────────────────

/// An entity that can own documents.
pub trait OwnerNode: Sized + Send + Sync + 'static {
  type Document;

  fn identity(&self) -> EntityIdentity;

  fn documents(&self) -> &[Arc<Self::Document>];

  /// Install the owned documents. Only called while an aggregate is built.
  fn set_documents(&mut self, documents: Vec<Arc<Self::Document>>);
}

/// A document pointing back at its owner.
pub trait DocumentNode: Sized + Send + Sync + 'static {
  type Owner;

  fn owner(&self) -> Option<&OwnerRef<Self::Owner>>;

  /// Install the back-reference. Only called while a document is built.
  fn set_owner(&mut self, owner: Option<OwnerRef<Self::Owner>>);
}

/// Build the shared aggregate of `owner` and its `documents`, pointing every
/// document back at the owner.
///
/// Fails with [`Error::CannotOwnDocuments`] when documents are given to an
/// owner whose kind cannot hold any.
pub fn assemble<O>(mut owner: O, documents: Vec<O::Document>) -> Result<Arc<O>>
where
  O: OwnerNode,
  O::Document: DocumentNode<Owner = O>,
{
  let identity = owner.identity();
  if !documents.is_empty() && !identity.kind.can_own_documents() {
    return Err(Error::CannotOwnDocuments(identity.kind));
  }

  Ok(Arc::new_cyclic(|this| {
    let documents = documents
      .into_iter()
      .map(|mut document| {
        document.set_owner(Some(OwnerRef::attached(identity, this.clone())));
        Arc::new(document)
      })
      .collect();
    owner.set_documents(documents);
    owner
  }))
}
