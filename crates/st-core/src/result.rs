//! Result type alias for SiteTrack operations

use crate::error::CoreError;

/// Standard Result type for SiteTrack operations
pub type CoreResult<T> = Result<T, CoreError>;
