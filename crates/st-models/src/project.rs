//! Project model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use st_attachments::{Attachment, AttachmentList};
use st_core::error::ValidationErrors;
use st_core::traits::{Entity, Id, Identifiable, Timestamped};
use st_core::types::{Reference, Tag};
use st_core::{CoreError, CoreResult};

use crate::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Active,
    OnHold,
    Completed,
}

/// A construction project: the top-level record sites, tasks, and issues
/// hang off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub name: String,
    /// Short site code used on drawings and daily reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<Reference<UserSummary>>,
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

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            code: None,
            status: ProjectStatus::default(),
            start_date: None,
            end_date: None,
            manager: None,
            tags: Vec::new(),
            attachments: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "must not be blank");
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.add("endDate", "must not be before the start date");
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The JSON body of the next create/update request. The attachment
    /// array goes out wholesale, in list order.
    pub fn save_payload(&self) -> CoreResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| CoreError::Internal(e.to_string()))
    }

    /// Detach the attachment list for editing in a form
    pub fn attachment_list(&self) -> AttachmentList {
        AttachmentList::from(self.attachments.clone())
    }

    /// Write an edited list back, replacing the previous one
    pub fn set_attachments(&mut self, list: AttachmentList) {
        self.attachments = list.into_vec();
    }
}

impl Identifiable for Project {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Project {
    const TYPE_NAME: &'static str = "Project";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_name() {
        let project = Project::new("   ");
        let errors = project.validate().unwrap_err();
        assert!(errors.has_error("name"));
    }

    #[test]
    fn test_validate_date_ordering() {
        let mut project = Project::new("Riverside Depot");
        project.start_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        project.end_date = NaiveDate::from_ymd_opt(2026, 2, 1);

        let errors = project.validate().unwrap_err();
        assert!(errors.has_error("endDate"));

        project.end_date = NaiveDate::from_ymd_opt(2026, 9, 1);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_save_payload_carries_attachments_in_order() {
        let mut project = Project::new("Riverside Depot");
        let mut list = project.attachment_list();
        list.register(
            "plan.pdf",
            st_attachments::AttachmentKind::Document,
            "data:application/pdf;base64,AAAA",
            Some(4),
            None,
        );
        list.register(
            "site.jpg",
            st_attachments::AttachmentKind::Image,
            "data:image/jpeg;base64,BBBB",
            Some(4),
            None,
        );
        project.set_attachments(list);

        let payload = project.save_payload().unwrap();
        let attachments = payload["attachments"].as_array().unwrap();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0]["name"], "plan.pdf");
        assert_eq!(attachments[1]["name"], "site.jpg");
    }

    #[test]
    fn test_deserializes_expanded_and_bare_manager() {
        let expanded = r#"{
            "name": "Riverside Depot",
            "status": "active",
            "manager": {"id": "u1", "name": "Dana"}
        }"#;
        let project: Project = serde_json::from_str(expanded).unwrap();
        assert_eq!(project.manager.as_ref().and_then(|m| m.id()), Some("u1"));

        let bare = r#"{"name": "Riverside Depot", "status": "active", "manager": "u1"}"#;
        let project: Project = serde_json::from_str(bare).unwrap();
        assert_eq!(project.manager.as_ref().and_then(|m| m.id()), Some("u1"));
    }

    #[test]
    fn test_legacy_attachments_resolve_kinds() {
        // GET response with an attachment in the legacy shape
        let raw = r#"{
            "id": "p1",
            "name": "Riverside Depot",
            "status": "active",
            "attachments": [
                {"name": "a.png", "url": "data:image/png;base64,AAAA",
                 "uploadedAt": "2025-06-01T08:00:00Z"}
            ]
        }"#;

        let mut project: Project = serde_json::from_str(raw).unwrap();
        assert_eq!(project.attachments[0].kind, None);

        for attachment in &mut project.attachments {
            attachment.resolve();
        }
        assert!(project.attachments[0].is_image());
    }
}
