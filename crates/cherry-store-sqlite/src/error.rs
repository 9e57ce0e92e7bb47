//! Error type for `cherry-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cherry_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A value does not fit the column it is stored in.
  #[error("value out of range for column `{0}`")]
  OutOfRange(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
