//! Axum routes for the intake endpoint.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::handlers::{analyze_message, health, IntakeAppState};
use crate::adapters::http::middleware::{session_cookie_middleware, SessionCookieSigner};

/// Room for multipart framing and the text field on top of the image.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Creates routes for intake endpoints.
///
/// - POST /analyze-message - Process one chat turn
/// - POST /api/analyze-message - Same, under the API prefix
pub fn intake_routes() -> Router<IntakeAppState> {
    Router::new()
        .route("/analyze-message", post(analyze_message))
        .route("/api/analyze-message", post(analyze_message))
}

/// Full router: intake routes behind the session cookie, plus `GET /health`.
pub fn intake_router(state: IntakeAppState, signer: SessionCookieSigner) -> Router {
    let body_limit = state.image_policy.max_bytes + BODY_OVERHEAD_BYTES;

    let intake = intake_routes()
        .layer(axum::middleware::from_fn_with_state(
            Arc::new(signer),
            session_cookie_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/health", get(health))
        .merge(intake)
        .with_state(state)
}
