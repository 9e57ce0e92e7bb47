//! Error types for `cherry-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{content::ContentId, identity::EntityKind};

/// Coarse classification of an [`Error`], used by outer layers to choose a
/// response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
  BadRequest,
  NotFound,
  Internal,
}

#[derive(Debug, Error)]
pub enum Error {
  // ── Entities ──────────────────────────────────────────────────────────

  #[error("{kind} not found: {id}")]
  NotFound { kind: EntityKind, id: Uuid },

  #[error("invalid value {value:?} for {kind} field `{field}`")]
  InvalidField {
    kind:  EntityKind,
    field: &'static str,
    value: String,
  },

  #[error("{0} entities cannot own documents")]
  CannotOwnDocuments(EntityKind),

  #[error("repository error: {0}")]
  Repository(#[source] Box<dyn std::error::Error + Send + Sync>),

  // ── Content store ─────────────────────────────────────────────────────

  #[error("content store failure for {content_id}: {source}")]
  ContentStore {
    content_id: ContentId,
    source:     std::io::Error,
  },

  #[error("content not found: {0}")]
  ContentNotFound(ContentId),

  #[error("document {0} has no content")]
  NoContent(Uuid),

  // ── Document content ──────────────────────────────────────────────────

  /// The payload of a document could not be read or classified.
  #[error("document content error: {0}")]
  DocumentContent(String),
}

impl Error {
  /// Wrap a backend error.
  pub fn repository<E>(error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Repository(Box::new(error))
  }

  /// The kind of entity the failure concerns.
  pub fn entity_kind(&self) -> EntityKind {
    match self {
      Self::NotFound { kind, .. } | Self::InvalidField { kind, .. } => *kind,
      Self::CannotOwnDocuments(kind) => *kind,
      Self::Repository(_) => EntityKind::Unspecified,
      Self::ContentStore { .. } | Self::ContentNotFound(_) | Self::NoContent(_) => {
        EntityKind::Document
      }
      Self::DocumentContent(_) => EntityKind::DocumentContent,
    }
  }

  pub fn status(&self) -> StatusClass {
    match self {
      Self::NotFound { .. } | Self::ContentNotFound(_) | Self::NoContent(_) => {
        StatusClass::NotFound
      }
      Self::InvalidField { .. }
      | Self::CannotOwnDocuments(_)
      | Self::DocumentContent(_) => StatusClass::BadRequest,
      Self::Repository(_) | Self::ContentStore { .. } => StatusClass::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
