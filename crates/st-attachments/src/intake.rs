//! Intake validation
//!
//! Accept/reject decisions happen here, before any decoding or encoding.
//! Rejection is per file and never aborts the rest of a batch.

use thiserror::Error;
use tracing::debug;

use st_core::config::IntakeConfig;

use crate::model::{AttachmentKind, FileUpload};

/// Intake rejection reasons. Messages name the offending file so they can
/// surface to the user as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("{name} is not a supported file type ({content_type}); only images and PDF documents can be attached")]
    UnsupportedType { name: String, content_type: String },

    #[error("{name} is too large ({size} bytes, max {max} bytes)")]
    TooLarge { name: String, size: usize, max: usize },
}

/// Accept/reject policy applied to every selected file
#[derive(Debug, Clone)]
pub struct IntakePolicy {
    /// Size ceiling in bytes
    pub max_file_size: usize,
    /// Some flows accept photos only and exclude PDFs
    pub image_only: bool,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            image_only: false,
        }
    }
}

impl From<&IntakeConfig> for IntakePolicy {
    fn from(config: &IntakeConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            image_only: config.image_only,
        }
    }
}

impl IntakePolicy {
    pub fn new(max_file_size: usize) -> Self {
        Self {
            max_file_size,
            ..Default::default()
        }
    }

    pub fn image_only(mut self) -> Self {
        self.image_only = true;
        self
    }

    /// Decide accept/reject for a file, returning the classification the
    /// registrar will store. Runs before any expensive work; an accepted
    /// file passes through unchanged.
    pub fn check(&self, file: &FileUpload) -> Result<AttachmentKind, IntakeError> {
        let size = file.size();
        if size > self.max_file_size {
            return Err(IntakeError::TooLarge {
                name: file.name.clone(),
                size,
                max: self.max_file_size,
            });
        }

        let content_type = file.effective_content_type();
        let accepted = content_type.starts_with("image/")
            || (!self.image_only && content_type == "application/pdf");
        if !accepted {
            return Err(IntakeError::UnsupportedType {
                name: file.name.clone(),
                content_type,
            });
        }

        let kind = AttachmentKind::from_content_type(&content_type);
        debug!(name = %file.name, size = size, kind = %kind, "File accepted for intake");
        Ok(kind)
    }
}
