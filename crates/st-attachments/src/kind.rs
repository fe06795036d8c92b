//! Kind resolution for attachments lacking an explicit kind
//!
//! Records written by older clients (and some external integrations) carry
//! a payload but no `kind`. Display code needs one to pick a renderer, so
//! it is inferred from the payload and cached on the record.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::encode::split_data_uri;
use crate::model::{Attachment, AttachmentKind};

static IMAGE_EXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(jpe?g|png|gif|webp)(\?.*)?$").expect("image extension pattern")
});

/// Infer a kind from a payload string.
///
/// A data URI resolves by its embedded MIME type; anything else (a legacy
/// storage URL, a bare path) resolves by its trailing extension. Pure and
/// deterministic: the same payload always resolves to the same kind.
pub fn resolve_kind(payload: &str) -> AttachmentKind {
    if let Some((content_type, _)) = split_data_uri(payload) {
        return AttachmentKind::from_content_type(content_type);
    }

    if IMAGE_EXT_RE.is_match(payload) {
        AttachmentKind::Image
    } else {
        AttachmentKind::Document
    }
}

impl Attachment {
    /// The kind to render with: the explicit kind when present, otherwise
    /// derived from the payload.
    pub fn resolved_kind(&self) -> AttachmentKind {
        self.kind.unwrap_or_else(|| resolve_kind(&self.payload))
    }

    /// Resolve and cache the kind. Idempotent; an explicitly-set kind is
    /// never overwritten.
    pub fn resolve(&mut self) -> AttachmentKind {
        let kind = self.resolved_kind();
        self.kind.get_or_insert(kind);
        kind
    }
}
