//! Intake configuration (uploads, sessions, visa data)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Intake configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    /// Largest accepted image upload in bytes
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// Accepted image extensions (comma-separated)
    #[serde(default = "default_allowed_image_extensions")]
    pub allowed_image_extensions: String,

    /// Seconds without a request before a session is evicted
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// Upper bound on live sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Path to the visa requirement table
    #[serde(default = "default_visa_table_path")]
    pub visa_table_path: PathBuf,

    /// Path to the country display names
    #[serde(default = "default_country_names_path")]
    pub country_names_path: PathBuf,
}

impl IntakeConfig {
    /// Allowed extensions, lowercased and without dots.
    pub fn allowed_extensions(&self) -> Vec<String> {
        self.allowed_image_extensions
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Validate intake configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_image_bytes == 0 {
            return Err(ValidationError::InvalidImageLimit);
        }
        if self.allowed_extensions().is_empty() {
            return Err(ValidationError::NoImageExtensions);
        }
        if self.max_sessions == 0 {
            return Err(ValidationError::InvalidSessionCapacity);
        }
        Ok(())
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
            allowed_image_extensions: default_allowed_image_extensions(),
            session_idle_secs: default_session_idle_secs(),
            max_sessions: default_max_sessions(),
            visa_table_path: default_visa_table_path(),
            country_names_path: default_country_names_path(),
        }
    }
}

fn default_max_image_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_allowed_image_extensions() -> String {
    "png,jpg,jpeg,webp".to_string()
}

fn default_session_idle_secs() -> u64 {
    3600
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_visa_table_path() -> PathBuf {
    PathBuf::from("assets/visa_information.json")
}

fn default_country_names_path() -> PathBuf {
    PathBuf::from("assets/country_names.json")
}
