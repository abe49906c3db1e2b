//! Request and response bodies for the intake endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CountryCode;
use crate::domain::intake::IntakeOutcome;

/// JSON request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome status as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Complete,
    Incomplete,
    Error,
}

/// Response body.
///
/// Country fields use a double `Option`: the outer one drops the field,
/// the inner one renders `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMessageResponse {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_country: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_country: Option<Option<String>>,
}

impl AnalyzeMessageResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            passport_country: None,
            destination_country: None,
        }
    }
}

fn code_field(code: Option<CountryCode>) -> Option<Option<String>> {
    Some(code.map(|c| c.as_str().to_string()))
}

impl From<IntakeOutcome> for AnalyzeMessageResponse {
    fn from(outcome: IntakeOutcome) -> Self {
        match outcome {
            IntakeOutcome::Greeting { message } => Self {
                status: ResponseStatus::Complete,
                message,
                passport_country: None,
                destination_country: None,
            },
            IntakeOutcome::Incomplete {
                message,
                passport,
                destination,
            } => Self {
                status: ResponseStatus::Incomplete,
                message,
                passport_country: code_field(passport),
                destination_country: code_field(destination),
            },
            IntakeOutcome::Complete {
                message,
                passport,
                destination,
            } => Self {
                status: ResponseStatus::Complete,
                message,
                passport_country: code_field(Some(passport)),
                destination_country: code_field(Some(destination)),
            },
            IntakeOutcome::Failed { message, .. } => Self::error(message),
        }
    }
}
