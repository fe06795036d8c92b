//! Attachment registration
//!
//! The host form owns one pending list per record. Registration appends;
//! removal is by index before save. The full list, not a delta, is what the
//! next create/update request serializes, so append order is what the
//! server sees.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::{Attachment, AttachmentKind};

/// List-level errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("Attachment index {index} is out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A host record's pending attachment list.
///
/// Purely in-memory; entries become durable only when the host record's
/// save request succeeds. No network I/O happens here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentList {
    items: Vec<Attachment>,
}

impl AttachmentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a validated, encoded file into an attachment record and
    /// append it. `uploaded_at` is set here — intake time, not submission
    /// time — and `kind` is the validator's classification, never
    /// re-derived later.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: AttachmentKind,
        payload: impl Into<String>,
        size: Option<i64>,
        digest: Option<String>,
    ) -> &Attachment {
        let mut attachment = Attachment::new(name, kind, payload);
        attachment.size = size;
        attachment.digest = digest;

        debug!(name = %attachment.name, kind = %kind, index = self.items.len(), "Attachment registered");
        self.items.push(attachment);
        // Just pushed, so the list is non-empty
        &self.items[self.items.len() - 1]
    }

    /// Append an already-built record (e.g. loaded from the server)
    pub fn push(&mut self, attachment: Attachment) {
        self.items.push(attachment);
    }

    /// Remove exactly one entry by index, preserving the relative order of
    /// the rest. Used when the user drops a file before saving.
    pub fn remove(&mut self, index: usize) -> Result<Attachment, AttachmentError> {
        if index >= self.items.len() {
            return Err(AttachmentError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Attachment] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attachment> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Attachment> {
        self.items
    }
}

impl From<Vec<Attachment>> for AttachmentList {
    fn from(items: Vec<Attachment>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a AttachmentList {
    type Item = &'a Attachment;
    type IntoIter = std::slice::Iter<'a, Attachment>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
