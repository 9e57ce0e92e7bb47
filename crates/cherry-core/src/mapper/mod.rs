//! Conversion between the client and storage representations.
//!
//! Entities form a graph: an owner holds its documents, and every document
//! points back at its owner. Converting any node converts whatever it is
//! linked to, and the [`MappingContext`] makes sure each source is converted
//! exactly once per pass. An owner is registered in the context before its
//! documents are walked, so a document reaching back to it picks up the
//! target under construction instead of starting over.
//!
//! Conversion never invents or drops links: a document without an owner maps
//! to a document without an owner, and a document whose owner is no longer
//! alive maps to a document with a detached owner reference.

mod context;
mod copier;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use context::MappingContext;
pub use copier::{ClientCopy, ClientToPersistent, Direction, PersistentCopy, PersistentToClient};

use crate::{
  Result,
  client::{Document, Entity},
  graph::{DocumentNode, OwnerNode, OwnerRef},
  persistent::{BaseEntity, DocumentEntity},
};

// ─── Graph walk ──────────────────────────────────────────────────────────────

/// Convert an owner and everything it owns.
pub fn map_owner<D: Direction>(
  source: &Arc<D::SourceOwner>,
  ctx: &mut MappingContext,
) -> Result<Arc<D::TargetOwner>> {
  if let Some(target) = ctx.mapped::<_, D::TargetOwner>(source) {
    return Ok(target);
  }

  let mut target = D::copy_owner(source)?;
  let mut failure = None;
  let target = Arc::new_cyclic(|this| {
    ctx.building(source, this.clone());
    let documents: Result<Vec<_>> = source
      .documents()
      .iter()
      .map(|document| map_document::<D>(document, ctx))
      .collect();
    match documents {
      Ok(documents) => target.set_documents(documents),
      Err(e) => failure = Some(e),
    }
    target
  });
  if let Some(e) = failure {
    return Err(e);
  }

  ctx.built(source, target.clone());
  Ok(target)
}

/// Convert a document, together with its owner if the owner is alive.
pub fn map_document<D: Direction>(
  source: &Arc<D::SourceDocument>,
  ctx: &mut MappingContext,
) -> Result<Arc<D::TargetDocument>> {
  if let Some(target) = ctx.mapped::<_, D::TargetDocument>(source) {
    return Ok(target);
  }

  let owner = source
    .owner()
    .map(|owner| map_owner_ref::<D>(owner, ctx))
    .transpose()?;

  // Walking the owner converts its documents, this one included.
  if let Some(target) = ctx.mapped::<_, D::TargetDocument>(source) {
    return Ok(target);
  }

  let mut target = D::copy_document(source)?;
  target.set_owner(owner);
  let target = Arc::new(target);
  ctx.built(source, target.clone());
  Ok(target)
}

pub fn map_documents<D: Direction>(
  sources: &[Arc<D::SourceDocument>],
  ctx: &mut MappingContext,
) -> Result<Vec<Arc<D::TargetDocument>>> {
  sources
    .iter()
    .map(|source| map_document::<D>(source, ctx))
    .collect()
}

pub fn map_owners<D: Direction>(
  sources: &[Arc<D::SourceOwner>],
  ctx: &mut MappingContext,
) -> Result<Vec<Arc<D::TargetOwner>>> {
  sources
    .iter()
    .map(|source| map_owner::<D>(source, ctx))
    .collect()
}

fn map_owner_ref<D: Direction>(
  owner: &OwnerRef<D::SourceOwner>,
  ctx: &mut MappingContext,
) -> Result<OwnerRef<D::TargetOwner>> {
  let identity = owner.identity();
  let Some(source) = owner.upgrade() else {
    return Ok(OwnerRef::detached(identity));
  };
  if let Some(target) = ctx.link::<_, D::TargetOwner>(&source) {
    return Ok(OwnerRef::attached(identity, target));
  }
  let target = map_owner::<D>(&source, ctx)?;
  Ok(OwnerRef::attached(identity, Arc::downgrade(&target)))
}

// ─── Facades ─────────────────────────────────────────────────────────────────

/// Document conversions in every direction.
#[derive(Debug)]
pub struct DocumentMapper;

impl DocumentMapper {
  pub fn from_persistent(
    source: &Arc<DocumentEntity>,
    ctx: &mut MappingContext,
  ) -> Result<Arc<Document>> {
    map_document::<PersistentToClient>(source, ctx)
  }

  pub fn from_persistent_list(
    sources: &[Arc<DocumentEntity>],
    ctx: &mut MappingContext,
  ) -> Result<Vec<Arc<Document>>> {
    map_documents::<PersistentToClient>(sources, ctx)
  }

  /// Client to storage. A payload pending on the client document is not
  /// carried over.
  pub fn from_client(
    source: &Arc<Document>,
    ctx: &mut MappingContext,
  ) -> Result<Arc<DocumentEntity>> {
    map_document::<ClientToPersistent>(source, ctx)
  }

  pub fn from_client_list(
    sources: &[Arc<Document>],
    ctx: &mut MappingContext,
  ) -> Result<Vec<Arc<DocumentEntity>>> {
    map_documents::<ClientToPersistent>(sources, ctx)
  }

  pub fn copy_client(source: &Arc<Document>, ctx: &mut MappingContext) -> Result<Arc<Document>> {
    map_document::<ClientCopy>(source, ctx)
  }

  pub fn copy_persistent(
    source: &Arc<DocumentEntity>,
    ctx: &mut MappingContext,
  ) -> Result<Arc<DocumentEntity>> {
    map_document::<PersistentCopy>(source, ctx)
  }
}

/// Owner conversions in every direction, documents included.
#[derive(Debug)]
pub struct EntityMapper;

impl EntityMapper {
  pub fn from_persistent(source: &Arc<BaseEntity>, ctx: &mut MappingContext) -> Result<Arc<Entity>> {
    map_owner::<PersistentToClient>(source, ctx)
  }

  pub fn from_persistent_list(
    sources: &[Arc<BaseEntity>],
    ctx: &mut MappingContext,
  ) -> Result<Vec<Arc<Entity>>> {
    map_owners::<PersistentToClient>(sources, ctx)
  }

  pub fn from_client(source: &Arc<Entity>, ctx: &mut MappingContext) -> Result<Arc<BaseEntity>> {
    map_owner::<ClientToPersistent>(source, ctx)
  }

  pub fn from_client_list(
    sources: &[Arc<Entity>],
    ctx: &mut MappingContext,
  ) -> Result<Vec<Arc<BaseEntity>>> {
    map_owners::<ClientToPersistent>(sources, ctx)
  }

  pub fn copy_client(source: &Arc<Entity>, ctx: &mut MappingContext) -> Result<Arc<Entity>> {
    map_owner::<ClientCopy>(source, ctx)
  }

  pub fn copy_persistent(
    source: &Arc<BaseEntity>,
    ctx: &mut MappingContext,
  ) -> Result<Arc<BaseEntity>> {
    map_owner::<PersistentCopy>(source, ctx)
  }
}
