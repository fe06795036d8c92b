//! Core traits implemented by SiteTrack domain entities

use chrono::{DateTime, Utc};

/// Primary key type. The external API is a JSON document store with
/// string identifiers, so ids are strings end to end.
pub type Id = String;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Option<&str>;

    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    fn is_new_record(&self) -> bool {
        !self.is_persisted()
    }
}

/// Trait for entities with timestamps (created_at, updated_at)
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

/// Base trait for all domain entities
pub trait Entity: Identifiable + Timestamped + Send + Sync {
    /// Human-readable type name for error messages
    const TYPE_NAME: &'static str;
}
