//! Task model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use st_attachments::{Attachment, AttachmentList};
use st_core::error::ValidationErrors;
use st_core::traits::{Entity, Id, Identifiable, Timestamped};
use st_core::types::{Reference, Tag};
use st_core::{CoreError, CoreResult};

use crate::project::Project;
use crate::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Blocked,
    Done,
}

/// A unit of site work inside a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub project: Reference<Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Reference<UserSummary>>,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Append-order; replaced wholesale on save
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(title: impl Into<String>, project: Reference<Project>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            project,
            assignee: None,
            status: TaskStatus::default(),
            due_date: None,
            tags: Vec::new(),
            attachments: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "must not be blank");
        }
        if self.project.id().is_none() && !self.project.is_populated() {
            errors.add("project", "must reference a project");
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

    pub fn is_open(&self) -> bool {
        !matches!(self.status, TaskStatus::Done)
    }
}

impl Identifiable for Task {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Timestamped for Task {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Task {
    const TYPE_NAME: &'static str = "Task";
}
