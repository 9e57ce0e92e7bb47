//! MIME type detection for document payloads.
//!
//! [`SignatureDetector`] looks at the leading bytes first, falls back to the
//! file extension, and finally tells text from binary.

use std::{fs::File, io::Read, path::Path};

use crate::{Error, Result, document::DEFAULT_MIME_TYPE};

/// Number of leading bytes inspected when sniffing a stream.
pub const SNIFF_LEN: usize = 512;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Classifies a payload by content and, optionally, file name.
pub trait MimeDetector: Send + Sync {
  /// Detect the MIME type from the head of a payload.
  fn detect(&self, head: &[u8], file_name: Option<&str>) -> String;

  /// Detect the MIME type from the first [`SNIFF_LEN`] bytes of `reader`.
  fn detect_reader(&self, reader: &mut dyn Read, file_name: Option<&str>) -> Result<String> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    reader
      .take(SNIFF_LEN as u64)
      .read_to_end(&mut head)
      .map_err(|e| Error::DocumentContent(format!("cannot read content stream: {e}")))?;
    Ok(self.detect(&head, file_name))
  }

  fn detect_path(&self, path: &Path) -> Result<String> {
    let mut file = File::open(path)
      .map_err(|e| Error::DocumentContent(format!("cannot open {}: {e}", path.display())))?;
    let file_name = path.to_string_lossy();
    self.detect_reader(&mut file, Some(&file_name))
  }
}

// ─── Signature detector ──────────────────────────────────────────────────────

/// The default [`MimeDetector`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureDetector;

/// `(offset, magic, mime type)`
const SIGNATURES: &[(usize, &[u8], &str)] = &[
  (0, b"\x89PNG\r\n\x1a\n", "image/png"),
  (0, b"\xff\xd8\xff", "image/jpeg"),
  (0, b"GIF87a", "image/gif"),
  (0, b"GIF89a", "image/gif"),
  (0, b"%PDF-", "application/pdf"),
  (0, b"PK\x03\x04", "application/zip"),
  (0, b"\x1f\x8b", "application/gzip"),
  (0, b"BM", "image/bmp"),
  (0, b"II*\0", "image/tiff"),
  (0, b"MM\0*", "image/tiff"),
  (0, b"ID3", "audio/mpeg"),
  (0, b"\xff\xfb", "audio/mpeg"),
  (0, b"OggS", "audio/ogg"),
  (4, b"ftyp", "video/mp4"),
  (0, b"<?xml", "application/xml"),
];

/// ZIP containers whose real type is only visible from the extension.
const ZIP_CONTAINERS: &[&str] = &["docx", "xlsx", "pptx", "odt", "ods", "odp", "epub", "jar"];

const EXTENSIONS: &[(&str, &str)] = &[
  ("txt", "text/plain"),
  ("md", "text/markdown"),
  ("csv", "text/csv"),
  ("htm", "text/html"),
  ("html", "text/html"),
  ("css", "text/css"),
  ("js", "text/javascript"),
  ("json", "application/json"),
  ("xml", "application/xml"),
  ("pdf", "application/pdf"),
  ("png", "image/png"),
  ("jpg", "image/jpeg"),
  ("jpeg", "image/jpeg"),
  ("gif", "image/gif"),
  ("webp", "image/webp"),
  ("svg", "image/svg+xml"),
  ("ico", "image/vnd.microsoft.icon"),
  ("bmp", "image/bmp"),
  ("tif", "image/tiff"),
  ("tiff", "image/tiff"),
  ("mp3", "audio/mpeg"),
  ("ogg", "audio/ogg"),
  ("wav", "audio/wav"),
  ("mp4", "video/mp4"),
  ("zip", "application/zip"),
  ("gz", "application/gzip"),
  ("tar", "application/x-tar"),
  ("doc", "application/msword"),
  ("xls", "application/vnd.ms-excel"),
  ("ppt", "application/vnd.ms-powerpoint"),
  (
    "docx",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
  ),
  (
    "xlsx",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
  ),
  (
    "pptx",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
  ),
  ("odt", "application/vnd.oasis.opendocument.text"),
  ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
  ("odp", "application/vnd.oasis.opendocument.presentation"),
  ("epub", "application/epub+zip"),
  ("jar", "application/java-archive"),
];

impl SignatureDetector {
  fn sniff(head: &[u8]) -> Option<&'static str> {
    if let Some(mime) = Self::riff(head) {
      return Some(mime);
    }
    if let Some(&(_, _, mime)) = SIGNATURES
      .iter()
      .find(|(offset, magic, _)| head.get(*offset..).is_some_and(|h| h.starts_with(magic)))
    {
      return Some(mime);
    }
    Self::markup(head)
  }

  /// RIFF containers carry their format at offset 8.
  fn riff(head: &[u8]) -> Option<&'static str> {
    if !head.starts_with(b"RIFF") {
      return None;
    }
    match head.get(8..12)? {
      b"WEBP" => Some("image/webp"),
      b"WAVE" => Some("audio/wav"),
      _ => None,
    }
  }

  fn markup(head: &[u8]) -> Option<&'static str> {
    let start = head.iter().position(|b| !b.is_ascii_whitespace())?;
    let text = &head[start..];
    let lower: Vec<u8> = text.iter().take(16).map(u8::to_ascii_lowercase).collect();
    if lower.starts_with(b"<!doctype html") || lower.starts_with(b"<html") {
      return Some("text/html");
    }
    if matches!(text.first(), Some(b'{') | Some(b'['))
      && std::str::from_utf8(text).is_ok_and(|s| {
        let s = s.trim_end();
        s.ends_with('}') || s.ends_with(']')
      })
    {
      return Some("application/json");
    }
    None
  }

  fn by_extension(file_name: Option<&str>) -> Option<&'static str> {
    let ext = Path::new(file_name?).extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
      .iter()
      .find(|(known, _)| *known == ext)
      .map(|&(_, mime)| mime)
  }

  fn is_zip_container(file_name: Option<&str>) -> bool {
    file_name
      .and_then(|name| Path::new(name).extension()?.to_str().map(str::to_ascii_lowercase))
      .is_some_and(|ext| ZIP_CONTAINERS.contains(&ext.as_str()))
  }

  /// Whether `head` looks like UTF-8 text. A multi-byte sequence cut off by
  /// the end of the buffer still counts.
  fn is_text(head: &[u8]) -> bool {
    match std::str::from_utf8(head) {
      Ok(text) => !text.contains('\0'),
      Err(e) => e.error_len().is_none() && !head[..e.valid_up_to()].contains(&0),
    }
  }
}

impl MimeDetector for SignatureDetector {
  fn detect(&self, head: &[u8], file_name: Option<&str>) -> String {
    let sniffed = Self::sniff(head);
    if sniffed == Some("application/zip")
      && Self::is_zip_container(file_name)
      && let Some(mime) = Self::by_extension(file_name)
    {
      return mime.to_owned();
    }
    let mime = sniffed
      .or_else(|| Self::by_extension(file_name))
      .unwrap_or(if Self::is_text(head) { DEFAULT_MIME_TYPE } else { OCTET_STREAM });
    mime.to_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detect(head: &[u8], name: Option<&str>) -> String { SignatureDetector.detect(head, name) }

  #[test]
  fn signatures_win_over_extensions() {
    assert_eq!(detect(b"%PDF-1.7\n...", Some("scan.txt")), "application/pdf");
    assert_eq!(detect(b"\xff\xd8\xff\xe0\0\x10JFIF", None), "image/jpeg");
    assert_eq!(detect(b"GIF89a\x01\0", None), "image/gif");
    assert_eq!(detect(b"RIFF\0\0\0\0WEBPVP8 ", None), "image/webp");
    assert_eq!(detect(b"\0\0\0\x18ftypmp42", None), "video/mp4");
  }

  #[test]
  fn office_documents_resolve_through_their_extension() {
    assert_eq!(
      detect(b"PK\x03\x04\x14\0\x06\0", Some("report.DOCX")),
      "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(detect(b"PK\x03\x04\x14\0\x06\0", Some("bundle.zip")), "application/zip");
  }

  #[test]
  fn markup_is_recognised() {
    assert_eq!(detect(b"  <!DOCTYPE html><html>", None), "text/html");
    assert_eq!(detect(b"<?xml version=\"1.0\"?>", None), "application/xml");
    assert_eq!(detect(b"{\"a\": 1}\n", None), "application/json");
  }

  #[test]
  fn extension_fallback_then_text_or_binary() {
    assert_eq!(detect(b"a,b,c\n1,2,3\n", Some("table.csv")), "text/csv");
    assert_eq!(detect("plain words, caf\u{e9}".as_bytes(), None), "text/plain");
    assert_eq!(detect(b"\0\x01\x02\x03binary", None), OCTET_STREAM);
    assert_eq!(detect(b"", None), DEFAULT_MIME_TYPE);
  }

  #[test]
  fn truncated_utf8_is_still_text() {
    let text = "na\u{ef}ve".as_bytes();
    assert_eq!(detect(&text[..3], None), "text/plain");
  }

  #[test]
  fn reader_only_consumes_the_head() {
    let mut payload = b"%PDF-1.4".to_vec();
    payload.extend(std::iter::repeat_n(b'x', 4 * SNIFF_LEN));
    let mut reader = std::io::Cursor::new(payload);

    let mime = SignatureDetector.detect_reader(&mut reader, None).unwrap();

    assert_eq!(mime, "application/pdf");
    assert_eq!(reader.position(), SNIFF_LEN as u64);
  }

  #[test]
  fn missing_path_is_a_content_error() {
    let err = SignatureDetector
      .detect_path(Path::new("/no/such/file.bin"))
      .unwrap_err();
    assert!(matches!(err, Error::DocumentContent(_)));
  }
}
