//! Attachment model

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Host record types that own attachment lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostKind {
    Issue,
    Task,
    Project,
    ProgressEntry,
}

impl HostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Task => "task",
            Self::Project => "project",
            Self::ProgressEntry => "progressEntry",
        }
    }
}

impl std::fmt::Display for HostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse classification of an attachment's content, used to choose a
/// renderer (inline image vs. document viewer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    /// PDFs and anything not recognized as an image
    Document,
}

impl AttachmentKind {
    /// Classify from a declared MIME type.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            Self::Image
        } else {
            Self::Document
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
        }
    }
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One uploaded file attached to a host record.
///
/// Serializes to the wire shape the external API exchanges. Legacy records
/// spell `kind` as `type` and `payload` as `url`; the aliases accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Original file name
    pub name: String,
    /// Derived once at intake; legacy records may lack it entirely
    #[serde(alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AttachmentKind>,
    /// Transport-encoded content, usable directly as a display source
    #[serde(alias = "url")]
    pub payload: String,
    /// Original byte length; absent on legacy entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    /// Intake time, set once, never mutated
    pub uploaded_at: DateTime<Utc>,
    /// SHA-256 of the original bytes; absent on legacy entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl Attachment {
    /// Create an attachment at intake time.
    pub fn new(
        name: impl Into<String>,
        kind: AttachmentKind,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind),
            payload: payload.into(),
            size: None,
            uploaded_at: Utc::now(),
            digest: None,
        }
    }

    /// Set the original byte length
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the content digest
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    /// Check if this renders as an image
    pub fn is_image(&self) -> bool {
        self.resolved_kind() == AttachmentKind::Image
    }

    /// Check if this renders as a document
    pub fn is_document(&self) -> bool {
        self.resolved_kind() == AttachmentKind::Document
    }

    /// Get file extension
    pub fn extension(&self) -> Option<&str> {
        if !self.name.contains('.') {
            return None;
        }
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| ext.len() <= 10 && !ext.is_empty())
    }

    /// Human-readable file size, for list views
    pub fn human_size(&self) -> Option<String> {
        let size = self.size? as f64;
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

        if size == 0.0 {
            return Some("0 B".to_string());
        }

        let base = 1024.0_f64;
        let i = (size.ln() / base.ln()).floor() as usize;
        let i = i.min(UNITS.len() - 1);

        let value = size / base.powi(i as i32);
        Some(format!("{:.1} {}", value, UNITS[i]))
    }
}

/// A file handle as delivered by a selection dialog: name, declared MIME
/// type, and the raw bytes.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Declared byte length
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The declared MIME type, falling back to a name-based guess when the
    /// selection dialog did not supply one.
    pub fn effective_content_type(&self) -> String {
        if self.content_type.is_empty() {
            mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .to_string()
        } else {
            self.content_type.clone()
        }
    }
}
