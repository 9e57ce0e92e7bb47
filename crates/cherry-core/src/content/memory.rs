//! A [`ContentStore`] kept entirely in memory.

use std::{
  collections::HashMap,
  sync::{PoisonError, RwLock},
};

use bytes::Bytes;
use tracing::debug;

use super::{ContentId, ContentStore};
use crate::Result;

/// In-memory content store, for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
  payloads: RwLock<HashMap<ContentId, Bytes>>,
}

impl InMemoryContentStore {
  pub fn new() -> Self { Self::default() }

  /// Number of payloads currently stored.
  pub fn len(&self) -> usize {
    self.payloads.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl ContentStore for InMemoryContentStore {
  async fn get(&self, id: ContentId) -> Result<Option<Bytes>> {
    let payloads = self.payloads.read().unwrap_or_else(PoisonError::into_inner);
    Ok(payloads.get(&id).cloned())
  }

  async fn set(&self, id: ContentId, content: Bytes) -> Result<()> {
    debug!(%id, len = content.len(), "storing payload in memory");
    let mut payloads = self.payloads.write().unwrap_or_else(PoisonError::into_inner);
    payloads.insert(id, content);
    Ok(())
  }

  async fn unset(&self, id: ContentId) -> Result<bool> {
    let mut payloads = self.payloads.write().unwrap_or_else(PoisonError::into_inner);
    Ok(payloads.remove(&id).is_some())
  }

  async fn exists(&self, id: ContentId) -> Result<bool> {
    let payloads = self.payloads.read().unwrap_or_else(PoisonError::into_inner);
    Ok(payloads.contains_key(&id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn set_get_unset() {
    let store = InMemoryContentStore::new();
    let id = ContentId::generate();

    assert_eq!(store.get(id).await.unwrap(), None);

    store.set(id, Bytes::from_static(b"hello")).await.unwrap();
    assert!(store.exists(id).await.unwrap());
    assert_eq!(store.get(id).await.unwrap().unwrap(), Bytes::from_static(b"hello"));

    store.set(id, Bytes::from_static(b"bye")).await.unwrap();
    assert_eq!(store.get(id).await.unwrap().unwrap(), Bytes::from_static(b"bye"));
    assert_eq!(store.len(), 1);

    assert!(store.unset(id).await.unwrap());
    assert!(!store.unset(id).await.unwrap());
    assert!(store.is_empty());
  }
}
