//! Visa Resolver Port - turns a confirmed country pair into a requirement message.

use async_trait::async_trait;

use crate::domain::foundation::CountryCode;

use super::AIError;

/// Port for resolving visa requirements.
#[async_trait]
pub trait VisaResolver: Send + Sync {
    /// Returns a human-readable requirement for `passport` travelling to `destination`.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError` when neither the table nor the estimation
    /// fallback can answer. Callers must keep the session slots in that case.
    async fn resolve(
        &self,
        passport: &CountryCode,
        destination: &CountryCode,
    ) -> Result<String, ResolutionError>;
}

/// Errors from visa resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// The generative estimate failed.
    #[error("estimation failed: {0}")]
    Estimation(#[from] AIError),

    /// The estimate came back empty.
    #[error("estimation returned no content")]
    EmptyEstimate,

    /// The call did not finish in time.
    #[error("visa lookup timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Resolver is not usable (e.g. table failed to load).
    #[error("visa data unavailable: {0}")]
    Unavailable(String),
}
