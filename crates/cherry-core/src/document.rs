//! Document-specific values shared by both representations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::identity::deserialize_enum;

/// MIME type assumed until a payload has been classified.
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// What a document is used for.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum DocumentKind {
  #[default]
  #[serde(rename = "UNSPECIFIED")]
  #[strum(serialize = "UNSPECIFIED")]
  Unspecified,
  #[serde(rename = "DOCUMENT_GENERIC")]
  #[strum(serialize = "DOCUMENT_GENERIC")]
  Generic,
  #[serde(rename = "DOCUMENT_PHOTO")]
  #[strum(serialize = "DOCUMENT_PHOTO")]
  Photo,
  #[serde(rename = "DOCUMENT_INVOICE")]
  #[strum(serialize = "DOCUMENT_INVOICE")]
  Invoice,
  #[serde(rename = "DOCUMENT_ICON")]
  #[strum(serialize = "DOCUMENT_ICON")]
  Icon,
}

impl<'de> Deserialize<'de> for DocumentKind {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserialize_enum(deserializer)
  }
}

/// A file name split into the parts a document records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileName {
  /// The final path component, e.g. `invoice-2024.pdf`.
  pub file_name: String,
  /// The file name without its extension, e.g. `invoice-2024`.
  pub stem:      String,
  /// The extension without the dot, e.g. `pdf`.
  pub extension: Option<String>,
}

impl FileName {
  /// Split the last component of `path`. Returns `None` when `path` does not
  /// end in a file name (empty, `..`, or a bare root).
  pub fn parse(path: &str) -> Option<Self> {
    let path = Path::new(path);
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    let stem = path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| file_name.clone());
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());
    Some(Self {
      file_name,
      stem,
      extension,
    })
  }
}

/// Where a document named `name` with `extension` is written under `dir`.
pub fn output_path(dir: &Path, name: &str, extension: Option<&str>) -> PathBuf {
  match extension {
    Some(ext) if !ext.is_empty() => dir.join(format!("{name}.{ext}")),
    _ => dir.join(name),
  }
}
