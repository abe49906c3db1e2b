//! Table-backed visa resolver with an LLM estimation fallback.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::ai::prompts::VISA_ESTIMATION_PROMPT;
use crate::adapters::ai::reply::strip_code_fence;
use crate::domain::foundation::CountryCode;
use crate::ports::{AIProvider, CompletionRequest, Message, ResolutionError, VisaResolver};

use super::VisaTable;

const ESTIMATION_PREFIX: &str = "(Estimation) ";

/// Settings for the estimation call.
#[derive(Debug, Clone)]
pub struct EstimationSettings {
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl Default for EstimationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(30),
            max_tokens: 300,
        }
    }
}

/// Resolves from the static table, estimating for passports it does not list.
pub struct TableVisaResolver {
    table: Arc<VisaTable>,
    estimator: Arc<dyn AIProvider>,
    settings: EstimationSettings,
}

impl TableVisaResolver {
    pub fn new(
        table: Arc<VisaTable>,
        estimator: Arc<dyn AIProvider>,
        settings: EstimationSettings,
    ) -> Self {
        Self {
            table,
            estimator,
            settings,
        }
    }

    async fn estimate(
        &self,
        passport: &CountryCode,
        destination: &CountryCode,
    ) -> Result<String, ResolutionError> {
        let question = format!(
            "Passport country: {} ({})\nDestination country: {} ({})",
            passport,
            self.table.passport_name(passport),
            destination,
            self.table.destination_name(destination),
        );
        let request = CompletionRequest::new()
            .with_system_prompt(VISA_ESTIMATION_PROMPT)
            .with_model(&self.settings.model)
            .with_temperature(0.0)
            .with_max_tokens(self.settings.max_tokens)
            .with_message(Message::user(question));

        let response = tokio::time::timeout(self.settings.timeout, self.estimator.complete(request))
            .await
            .map_err(|_| ResolutionError::Timeout {
                timeout_secs: self.settings.timeout.as_secs(),
            })??;

        let estimate = strip_code_fence(&response.content);
        if estimate.is_empty() {
            return Err(ResolutionError::EmptyEstimate);
        }
        Ok(format!("{}{}", ESTIMATION_PREFIX, estimate))
    }
}

#[async_trait]
impl VisaResolver for TableVisaResolver {
    async fn resolve(
        &self,
        passport: &CountryCode,
        destination: &CountryCode,
    ) -> Result<String, ResolutionError> {
        if let Some(message) = self.table.describe(passport, destination) {
            tracing::debug!(%passport, %destination, "Visa table hit");
            return Ok(message);
        }

        tracing::info!(%passport, %destination, "Passport not in visa table, estimating");
        self.estimate(passport, destination).await
    }
}
