//! # st-session
//!
//! Session context for SiteTrack.
//!
//! One injected object replaces ad hoc reads of browser storage scattered
//! across views: explicit `get`/`set`/`clear` over a pluggable store, plus
//! an expiry callback that fires once when a read observes an expired
//! session (the place the embedding app hangs its redirect-to-login).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use st_core::config::SessionConfig;
use thiserror::Error;
use tracing::{debug, info};

/// Session errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No session present")]
    Missing,
    #[error("Session expired")]
    Expired,
    #[error("Session storage unavailable: {0}")]
    Storage(String),
}

/// The session payload: the API token plus enough of the user to render
/// the header without another request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub token: String,
    pub user_id: String,
    pub user_name: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(
        token: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        lifetime_minutes: i64,
    ) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            expires_at: Utc::now() + Duration::minutes(lifetime_minutes),
        }
    }

    /// Build a session with the configured lifetime
    pub fn from_config(
        config: &SessionConfig,
        token: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self::new(token, user_id, user_name, config.timeout_minutes as i64)
    }

    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }

    /// Extend the session lifetime
    pub fn extend(&mut self, additional_minutes: i64) {
        self.expires_at = Utc::now() + Duration::minutes(additional_minutes);
    }
}

/// Persistence behind the session context. The embedding app supplies the
/// browser-storage implementation; the memory store covers tests and
/// non-browser hosts.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<SessionData>;
    fn save(&self, data: &SessionData) -> Result<(), SessionError>;
    fn delete(&self) -> Result<(), SessionError>;
}

/// In-memory session store (for development/testing)
#[derive(Default)]
pub struct MemorySessionStore {
    slot: std::sync::RwLock<Option<SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<SessionData> {
        self.slot.read().ok()?.clone()
    }

    fn save(&self, data: &SessionData) -> Result<(), SessionError> {
        let mut slot = self
            .slot
            .write()
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        *slot = Some(data.clone());
        Ok(())
    }

    fn delete(&self) -> Result<(), SessionError> {
        let mut slot = self
            .slot
            .write()
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

type ExpiryCallback = Box<dyn Fn() + Send + Sync>;

/// The injected session context
pub struct SessionContext<S: SessionStore> {
    store: S,
    on_expired: Option<ExpiryCallback>,
}

impl<S: SessionStore> SessionContext<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            on_expired: None,
        }
    }

    /// Register the callback fired when a read observes an expired session.
    /// The session is cleared before the callback runs, so the callback
    /// fires at most once per expiry.
    pub fn on_expired(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_expired = Some(Box::new(callback));
        self
    }

    /// The current session, if present and unexpired. An expired session is
    /// cleared and reported through the expiry callback.
    pub fn get(&self) -> Option<SessionData> {
        let data = self.store.load()?;
        if data.is_valid() {
            return Some(data);
        }

        info!(user_id = %data.user_id, "Session expired, clearing");
        let _ = self.store.delete();
        if let Some(callback) = &self.on_expired {
            callback();
        }
        None
    }

    /// The current session, or why there is none
    pub fn require(&self) -> Result<SessionData, SessionError> {
        match self.store.load() {
            None => Err(SessionError::Missing),
            Some(data) if data.is_valid() => Ok(data),
            Some(_) => {
                let _ = self.store.delete();
                if let Some(callback) = &self.on_expired {
                    callback();
                }
                Err(SessionError::Expired)
            }
        }
    }

    pub fn set(&self, data: SessionData) -> Result<(), SessionError> {
        debug!(user_id = %data.user_id, "Session stored");
        self.store.save(&data)
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        debug!("Session cleared");
        self.store.delete()
    }

    /// Convenience accessor for the bearer token
    pub fn token(&self) -> Option<String> {
        self.get().map(|data| data.token)
    }
}
