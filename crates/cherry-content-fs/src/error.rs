//! Error type for `cherry-content-fs`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("content store root is not configured")]
  EmptyRoot,

  #[error("cannot prepare content store root {}: {source}", path.display())]
  Root {
    path:   PathBuf,
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
