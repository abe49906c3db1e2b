//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Session secret must be set and at least 32 bytes in production")]
    WeakSessionSecret,

    #[error("Request timeout must exceed {minimum_secs}s (two AI calls), got {request_secs}s")]
    RequestTimeoutTooShort { request_secs: u64, minimum_secs: u64 },

    #[error("Invalid AI call timeout")]
    InvalidAiTimeout,

    #[error("Maximum image size must be greater than zero")]
    InvalidImageLimit,

    #[error("At least one image extension must be allowed")]
    NoImageExtensions,

    #[error("Session capacity must be greater than zero")]
    InvalidSessionCapacity,
}
