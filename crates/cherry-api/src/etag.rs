//! ETag computation for document payloads.
//!
//! ETags are quoted SHA-256 hashes of the payload bytes, so identical content
//! always yields the same tag no matter which document holds it.

use sha2::{Digest, Sha256};

pub fn compute_etag(content: &[u8]) -> String {
  format!("\"{}\"", hex::encode(Sha256::digest(content)))
}

/// Whether an `If-None-Match` header value matches `etag`.
pub fn matches(header: &str, etag: &str) -> bool {
  header.trim() == "*" || header.split(',').any(|candidate| {
    let candidate = candidate.trim();
    candidate.strip_prefix("W/").unwrap_or(candidate) == etag
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn etag_is_a_quoted_digest() {
    let etag = compute_etag(b"");
    assert_eq!(
      etag,
      "\"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\""
    );
  }

  #[test]
  fn different_content_changes_etag() {
    assert_ne!(compute_etag(b"a"), compute_etag(b"b"));
    assert_eq!(compute_etag(b"same"), compute_etag(b"same"));
  }

  #[test]
  fn if_none_match_lists_and_weak_tags() {
    let etag = compute_etag(b"payload");
    assert!(matches(&etag, &etag));
    assert!(matches(&format!("\"other\", W/{etag}"), &etag));
    assert!(matches("*", &etag));
    assert!(!matches("\"stale\"", &etag));
  }
}
