//! Content identifiers and the [`ContentStore`] abstraction.
//!
//! A document never stores its payload inline. When a payload is first saved
//! the document is given a [`ContentId`], independent of its row identifier,
//! and the bytes are written to a content store under that id. The id stays
//! the same when the payload is replaced, so a document can be re-uploaded
//! without touching anything that refers to it.

mod memory;

use std::{fmt, future::Future, str::FromStr};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

pub use memory::InMemoryContentStore;

// ─── ContentId ───────────────────────────────────────────────────────────────

/// Opaque identifier of a stored payload.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContentId(Uuid);

impl ContentId {
  /// A fresh, random identifier.
  pub fn generate() -> Self { Self(Uuid::new_v4()) }

  pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl From<Uuid> for ContentId {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for ContentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.hyphenated())
  }
}

impl FromStr for ContentId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Uuid::parse_str(s).map(Self) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A byte-addressable store of document payloads keyed by [`ContentId`].
///
/// All methods return `Send` futures so stores can be shared across tasks of
/// a multi-threaded runtime.
pub trait ContentStore: Send + Sync {
  /// Fetch the payload stored under `id`, or `None` if there is none.
  fn get(
    &self,
    id: ContentId,
  ) -> impl Future<Output = Result<Option<Bytes>>> + Send + '_;

  /// Store `content` under `id`, replacing any previous payload.
  fn set(
    &self,
    id: ContentId,
    content: Bytes,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Remove the payload under `id`. Returns `false` if nothing was stored.
  fn unset(&self, id: ContentId) -> impl Future<Output = Result<bool>> + Send + '_;

  fn exists(&self, id: ContentId) -> impl Future<Output = Result<bool>> + Send + '_;

  /// The location recorded on a document for the payload under `id`,
  /// relative to the store root.
  fn locate(&self, id: ContentId) -> String { format!("/{id}") }
}
