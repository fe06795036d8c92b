//! Configuration types and loading

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// External REST API
    pub api: ApiConfig,

    /// Session handling
    pub session: SessionConfig,

    /// Attachment intake pipeline
    pub intake: IntakeConfig,

    /// Dashboard refresh policy
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Key under which the embedding app persists the session
    pub storage_key: String,
    /// Session lifetime in minutes
    pub timeout_minutes: u64,
}

/// Attachment intake settings.
///
/// The resize bound is a parameter, not a constant: different upload flows
/// use different bounds (landscape 1920x1080 vs square 1920x1920), so call
/// sites take the bound from configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntakeConfig {
    /// Maximum accepted file size in bytes, checked before any processing
    pub max_file_size: usize,
    /// Image resize bound, width
    pub image_max_width: u32,
    /// Image resize bound, height
    pub image_max_height: u32,
    /// JPEG re-encode quality (0-100)
    pub jpeg_quality: u8,
    /// Restrict intake to images only (some flows exclude PDFs)
    pub image_only: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Polling interval in seconds; None disables interval refresh
    pub interval_seconds: Option<u64>,
    /// Refresh when the window regains focus
    pub refresh_on_focus: bool,
    /// Refresh when the page becomes visible again
    pub refresh_on_visibility: bool,
    /// Minimum spacing between refreshes in seconds
    pub min_spacing_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                request_timeout_seconds: 30,
            },
            session: SessionConfig {
                storage_key: "sitetrack_session".to_string(),
                timeout_minutes: 30,
            },
            intake: IntakeConfig::default(),
            refresh: RefreshConfig {
                interval_seconds: Some(60),
                refresh_on_focus: true,
                refresh_on_visibility: true,
                min_spacing_seconds: 5,
            },
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10 MiB
            image_max_width: 1920,
            image_max_height: 1080,
            jpeg_quality: 80,
            image_only: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SITETRACK_API_BASE_URL") {
            config.api.base_url = url;
        }
        if let Ok(timeout) = std::env::var("SITETRACK_API_TIMEOUT_SECONDS") {
            config.api.request_timeout_seconds = timeout.parse().unwrap_or(30);
        }

        if let Ok(key) = std::env::var("SITETRACK_SESSION_STORAGE_KEY") {
            config.session.storage_key = key;
        }
        if let Ok(minutes) = std::env::var("SITETRACK_SESSION_TIMEOUT_MINUTES") {
            config.session.timeout_minutes = minutes.parse().unwrap_or(30);
        }

        if let Ok(size) = std::env::var("SITETRACK_MAX_ATTACHMENT_SIZE") {
            config.intake.max_file_size = size.parse().unwrap_or(10 * 1024 * 1024);
        }
        if let Ok(width) = std::env::var("SITETRACK_IMAGE_MAX_WIDTH") {
            config.intake.image_max_width = width.parse().unwrap_or(1920);
        }
        if let Ok(height) = std::env::var("SITETRACK_IMAGE_MAX_HEIGHT") {
            config.intake.image_max_height = height.parse().unwrap_or(1080);
        }
        if let Ok(quality) = std::env::var("SITETRACK_JPEG_QUALITY") {
            config.intake.jpeg_quality = quality.parse().unwrap_or(80);
        }

        let parse_bool = |v: String| v == "true" || v == "1" || v == "yes";

        if let Ok(v) = std::env::var("SITETRACK_INTAKE_IMAGE_ONLY") {
            config.intake.image_only = parse_bool(v);
        }
        if let Ok(interval) = std::env::var("SITETRACK_REFRESH_INTERVAL_SECONDS") {
            config.refresh.interval_seconds = interval.parse().ok();
        }
        if let Ok(v) = std::env::var("SITETRACK_REFRESH_ON_FOCUS") {
            config.refresh.refresh_on_focus = parse_bool(v);
        }

        config
    }
}
