//! Common types used throughout SiteTrack

use serde::{Deserialize, Serialize};

use crate::traits::{Id, Identifiable};

/// A relation that may arrive from the API as a bare id or as a populated
/// object, depending on whether the endpoint expands it.
///
/// Replaces ad hoc `typeof x === 'object'` discrimination with an explicit
/// sum type and a single accessor that resolves either form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(Id),
    Populated(Box<T>),
}

impl<T> Reference<T> {
    pub fn from_id(id: impl Into<Id>) -> Self {
        Self::Id(id.into())
    }

    pub fn populated(value: T) -> Self {
        Self::Populated(Box::new(value))
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Populated(_))
    }

    /// The populated value, if the relation was expanded.
    pub fn as_populated(&self) -> Option<&T> {
        match self {
            Self::Populated(value) => Some(value),
            Self::Id(_) => None,
        }
    }
}

impl<T: Identifiable> Reference<T> {
    /// Resolve the id regardless of which form the relation arrived in.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Populated(value) => value.id(),
        }
    }
}

/// A classification tag on a site record.
///
/// The wire format is a plain string. Known names map to fixed members;
/// the legacy `other:<value>` prefix and any unknown name both map to
/// `Custom`, so no call site parses prefixes itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tag {
    Safety,
    Quality,
    Delay,
    Material,
    Equipment,
    Weather,
    Inspection,
    Custom(String),
}

impl Tag {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Safety => "safety",
            Self::Quality => "quality",
            Self::Delay => "delay",
            Self::Material => "material",
            Self::Equipment => "equipment",
            Self::Weather => "weather",
            Self::Inspection => "inspection",
            Self::Custom(value) => value,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        match s.as_str() {
            "safety" => Self::Safety,
            "quality" => Self::Quality,
            "delay" => Self::Delay,
            "material" => Self::Material,
            "equipment" => Self::Equipment,
            "weather" => Self::Weather,
            "inspection" => Self::Inspection,
            other => match other.strip_prefix("other:") {
                Some(value) => Self::Custom(value.to_string()),
                None => Self::Custom(s),
            },
        }
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.as_str().to_string()
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
