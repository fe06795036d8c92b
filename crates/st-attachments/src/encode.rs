//! Transport encoding
//!
//! Payloads travel inside JSON request bodies as data URIs, so the MIME
//! type and content stay together and the string renders directly in an
//! `<img src>` or an iframe without a separate fetch.

use base64::Engine;
use sha2::{Digest, Sha256};

/// Encode bytes as a self-describing data URI.
///
/// Deterministic: identical input bytes always yield the identical string.
pub fn to_data_uri(content_type: &str, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        base64::engine::general_purpose::STANDARD.encode(data)
    )
}

/// Split a data URI into its MIME type and base64 content.
///
/// Returns `None` for anything that is not a base64 data URI (e.g. a plain
/// storage URL on a legacy record).
pub fn split_data_uri(payload: &str) -> Option<(&str, &str)> {
    let rest = payload.strip_prefix("data:")?;
    rest.split_once(";base64,")
}

/// SHA-256 digest of the original bytes, hex encoded
pub fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
