//! User summary as embedded in expanded relations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use st_core::traits::{Id, Identifiable, Timestamped};

/// The slice of a user the API embeds when a relation is expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserSummary {
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            email: None,
        }
    }
}

impl Identifiable for UserSummary {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Timestamped for UserSummary {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}
