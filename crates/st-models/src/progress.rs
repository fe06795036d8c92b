//! Daily progress entry model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use st_attachments::{Attachment, AttachmentList};
use st_core::error::ValidationErrors;
use st_core::traits::{Entity, Id, Identifiable, Timestamped};
use st_core::{CoreError, CoreResult};

use crate::project::Project;
use st_core::types::Reference;

/// One day's progress report for a project, typically with site photos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub project: Reference<Project>,
    pub entry_date: NaiveDate,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workforce_count: Option<u32>,
    /// Append-order; replaced wholesale on save
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressEntry {
    pub fn new(project: Reference<Project>, entry_date: NaiveDate, summary: impl Into<String>) -> Self {
        Self {
            id: None,
            project,
            entry_date,
            summary: summary.into(),
            workforce_count: None,
            attachments: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.summary.trim().is_empty() {
            errors.add("summary", "must not be blank");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn save_payload(&self) -> CoreResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| CoreError::Internal(e.to_string()))
    }

    pub fn attachment_list(&self) -> AttachmentList {
        AttachmentList::from(self.attachments.clone())
    }

    pub fn set_attachments(&mut self, list: AttachmentList) {
        self.attachments = list.into_vec();
    }
}

impl Identifiable for ProgressEntry {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Timestamped for ProgressEntry {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for ProgressEntry {
    const TYPE_NAME: &'static str = "ProgressEntry";
}
