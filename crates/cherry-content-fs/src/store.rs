//! [`FilesystemContentStore`]: a [`ContentStore`] writing one file per
//! payload.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use bytes::Bytes;
use cherry_core::{
  Error as CoreError, Result as CoreResult,
  content::{ContentId, ContentStore},
};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Stores payloads as files under a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemContentStore {
  root: PathBuf,
}

impl FilesystemContentStore {
  /// Open a store rooted at `root`, creating the directory if needed.
  pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
    let root = root.into();
    if root.as_os_str().is_empty() {
      return Err(Error::EmptyRoot);
    }
    tokio::fs::create_dir_all(&root)
      .await
      .map_err(|source| Error::Root {
        path: root.clone(),
        source,
      })?;
    debug!(root = %root.display(), "opened content store");
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path { &self.root }

  /// The file holding the payload for `id`.
  pub fn path_of(&self, id: ContentId) -> PathBuf { self.root.join(id.to_string()) }
}

fn io_error(content_id: ContentId) -> impl FnOnce(std::io::Error) -> CoreError {
  move |source| CoreError::ContentStore { content_id, source }
}

impl ContentStore for FilesystemContentStore {
  async fn get(&self, id: ContentId) -> CoreResult<Option<Bytes>> {
    match tokio::fs::read(self.path_of(id)).await {
      Ok(content) => Ok(Some(Bytes::from(content))),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(io_error(id)(e)),
    }
  }

  /// Writes to a sibling temporary file and renames it into place, so a
  /// reader never sees a half-written payload.
  async fn set(&self, id: ContentId, content: Bytes) -> CoreResult<()> {
    let path = self.path_of(id);
    let partial = self.root.join(format!("{id}.partial"));
    tokio::fs::write(&partial, &content).await.map_err(io_error(id))?;
    if let Err(e) = tokio::fs::rename(&partial, &path).await {
      if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
        warn!(%id, error = %cleanup, "partial payload left behind");
      }
      return Err(io_error(id)(e));
    }
    debug!(%id, len = content.len(), path = %path.display(), "wrote payload");
    Ok(())
  }

  async fn unset(&self, id: ContentId) -> CoreResult<bool> {
    match tokio::fs::remove_file(self.path_of(id)).await {
      Ok(()) => {
        debug!(%id, "removed payload");
        Ok(true)
      }
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
      Err(e) => Err(io_error(id)(e)),
    }
  }

  async fn exists(&self, id: ContentId) -> CoreResult<bool> {
    tokio::fs::try_exists(self.path_of(id))
      .await
      .map_err(io_error(id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn open_creates_the_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("a").join("b");

    let store = FilesystemContentStore::open(&root).await.unwrap();

    assert!(root.is_dir());
    assert_eq!(store.root(), root);
  }

  #[tokio::test]
  async fn empty_root_is_rejected() {
    let err = FilesystemContentStore::open("").await.unwrap_err();
    assert!(matches!(err, Error::EmptyRoot));
  }

  #[tokio::test]
  async fn payload_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = FilesystemContentStore::open(dir.path()).await.unwrap();
    let id = ContentId::generate();

    assert_eq!(store.get(id).await.unwrap(), None);
    assert!(!store.exists(id).await.unwrap());

    store.set(id, Bytes::from_static(b"v1")).await.unwrap();
    store.set(id, Bytes::from_static(b"version two")).await.unwrap();
    assert_eq!(store.get(id).await.unwrap().unwrap(), Bytes::from_static(b"version two"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

    assert!(store.unset(id).await.unwrap());
    assert!(!store.unset(id).await.unwrap());
    assert!(!store.path_of(id).exists());
  }

  #[tokio::test]
  async fn failed_rename_leaves_no_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FilesystemContentStore::open(dir.path()).await.unwrap();
    let id = ContentId::generate();
    let blocker = store.path_of(id);
    std::fs::create_dir(&blocker).unwrap();
    std::fs::write(blocker.join("occupied"), b"x").unwrap();

    let err = store.set(id, Bytes::from_static(b"payload")).await.unwrap_err();

    assert!(matches!(err, CoreError::ContentStore { content_id, .. } if content_id == id));
    assert!(!dir.path().join(format!("{id}.partial")).exists());
  }

  #[tokio::test]
  async fn location_is_relative_to_the_root() {
    let dir = tempfile::tempdir().unwrap();
    let store = FilesystemContentStore::open(dir.path()).await.unwrap();
    let id = ContentId::generate();

    assert_eq!(store.locate(id), format!("/{id}"));
    assert_eq!(store.path_of(id), dir.path().join(id.to_string()));
  }
}
