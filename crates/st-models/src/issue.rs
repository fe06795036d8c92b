//! Issue model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use st_attachments::{Attachment, AttachmentList};
use st_core::error::ValidationErrors;
use st_core::traits::{Entity, Id, Identifiable, Timestamped};
use st_core::types::{Reference, Tag};
use st_core::{CoreError, CoreResult};

use crate::project::Project;
use crate::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Open,
    InReview,
    Resolved,
    Closed,
}

/// A defect or incident reported on site, usually with photo evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub project: Reference<Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<Reference<UserSummary>>,
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

impl Issue {
    pub fn new(title: impl Into<String>, project: Reference<Project>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            severity: IssueSeverity::default(),
            status: IssueStatus::default(),
            project,
            reported_by: None,
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
        matches!(self.status, IssueStatus::Open | IssueStatus::InReview)
    }
}

impl Identifiable for Issue {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Timestamped for Issue {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Issue {
    const TYPE_NAME: &'static str = "Issue";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(IssueSeverity::Critical > IssueSeverity::High);
        assert!(IssueSeverity::Medium > IssueSeverity::Low);
    }

    #[test]
    fn test_open_states() {
        let mut issue = Issue::new("Cracked slab", Reference::from_id("p1"));
        assert!(issue.is_open());

        issue.status = IssueStatus::Resolved;
        assert!(!issue.is_open());
    }

    #[test]
    fn test_save_round_trip_with_attachments() {
        let mut issue = Issue::new("Cracked slab", Reference::from_id("p1"));
        issue.severity = IssueSeverity::High;

        let mut list = issue.attachment_list();
        list.register(
            "crack.jpg",
            st_attachments::AttachmentKind::Image,
            "data:image/jpeg;base64,AAAA",
            Some(2048),
            None,
        );
        issue.set_attachments(list);

        let payload = issue.save_payload().unwrap();
        assert_eq!(payload["severity"], "high");
        assert_eq!(payload["attachments"][0]["kind"], "image");

        let back: Issue = serde_json::from_value(payload).unwrap();
        assert_eq!(back.attachments.len(), 1);
        assert_eq!(back, issue);
    }
}
