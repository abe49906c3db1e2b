//! HTTP handlers for the intake endpoint.
//!
//! These handlers turn JSON or multipart bodies into an
//! `AnalyzeMessageCommand` and map the outcome to a status code.

use std::sync::Arc;

use axum::extract::{FromRequest, Json, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::intake::{AnalyzeMessageCommand, AnalyzeMessageHandler};
use crate::domain::intake::{
    FailureKind, ImageUpload, ImageUploadPolicy, IntakeOutcome, INTERNAL_ERROR_MESSAGE,
};

use super::dto::{AnalyzeMessageRequest, AnalyzeMessageResponse};
use crate::adapters::http::middleware::CurrentSession;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for intake handlers.
#[derive(Clone)]
pub struct IntakeAppState {
    pub handler: Arc<AnalyzeMessageHandler>,
    pub image_policy: Arc<ImageUploadPolicy>,
}

impl IntakeAppState {
    pub fn new(handler: Arc<AnalyzeMessageHandler>, image_policy: ImageUploadPolicy) -> Self {
        Self {
            handler,
            image_policy: Arc::new(image_policy),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /analyze-message
// ════════════════════════════════════════════════════════════════════════════════

/// POST /analyze-message - Process one chat turn.
///
/// Accepts `application/json` (`{"message": ...}`) or `multipart/form-data`
/// with optional `message` and `image` fields. Unreadable bodies and
/// rejected images are treated as absent.
///
/// # Errors
/// - 502 Bad Gateway: visa lookup failed, session kept
/// - 500 Internal Server Error: unexpected fault
pub async fn analyze_message(
    State(state): State<IntakeAppState>,
    CurrentSession(session_key): CurrentSession,
    request: Request,
) -> Result<Json<AnalyzeMessageResponse>, IntakeApiError> {
    let (message, image) = read_input(&state, request).await;

    let mut cmd = AnalyzeMessageCommand::new(session_key);
    cmd.message = message;
    cmd.image = image;

    let outcome = state.handler.handle(cmd).await;
    match outcome {
        IntakeOutcome::Failed {
            kind: FailureKind::Resolution,
            message,
        } => Err(IntakeApiError::Resolution(message)),
        IntakeOutcome::Failed {
            kind: FailureKind::Internal,
            ..
        } => Err(IntakeApiError::Internal),
        outcome => Ok(Json(outcome.into())),
    }
}

/// GET /health - Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Body parsing
// ════════════════════════════════════════════════════════════════════════════════

async fn read_input(
    state: &IntakeAppState,
    request: Request,
) -> (Option<String>, Option<ImageUpload>) {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"));

    if is_multipart {
        match Multipart::from_request(request, state).await {
            Ok(multipart) => read_multipart(multipart, &state.image_policy).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected multipart body");
                (None, None)
            }
        }
    } else {
        match Json::<AnalyzeMessageRequest>::from_request(request, state).await {
            Ok(Json(body)) => (body.message, None),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected JSON body, treating as empty");
                (None, None)
            }
        }
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    policy: &ImageUploadPolicy,
) -> (Option<String>, Option<ImageUpload>) {
    let mut message = None;
    let mut image = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed multipart field, ignoring the rest");
                break;
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("message") => match field.text().await {
                Ok(text) => message = Some(text),
                Err(e) => tracing::warn!(error = %e, "Unreadable message field"),
            },
            Some("image") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(error = %e, "Unreadable image field");
                        continue;
                    }
                };
                // A file input left empty still sends a nameless, empty part.
                if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
                    continue;
                }
                match policy.accept(bytes.to_vec(), file_name.as_deref(), content_type.as_deref())
                {
                    Ok(upload) => image = Some(upload),
                    Err(rejection) => {
                        tracing::warn!(file = ?file_name, reason = %rejection, "Image rejected");
                    }
                }
            }
            other => tracing::debug!(field = ?other, "Ignoring unknown multipart field"),
        }
    }

    (message, image)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type for intake endpoints.
#[derive(Debug)]
pub enum IntakeApiError {
    /// Visa lookup failed; carries the client-facing message.
    Resolution(String),
    /// Unexpected fault; details are only logged.
    Internal,
}

impl IntoResponse for IntakeApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            IntakeApiError::Resolution(message) => (StatusCode::BAD_GATEWAY, message),
            IntakeApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_MESSAGE.to_string(),
            ),
        };
        (status, Json(AnalyzeMessageResponse::error(message))).into_response()
    }
}
