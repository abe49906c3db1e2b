//! Whole-request deadline middleware.
//!
//! Bounds the time a request may spend in the handler, including waiting
//! for a busy session. An expired request answers with the same JSON error
//! body as any other internal fault, never an empty timeout response.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/analyze-message", post(handler))
//!     .layer(middleware::from_fn_with_state(
//!         RequestDeadline::new(Duration::from_secs(90)),
//!         request_deadline_middleware,
//!     ));
//! ```

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::intake::INTERNAL_ERROR_MESSAGE;

/// Deadline applied to each request.
#[derive(Debug, Clone, Copy)]
pub struct RequestDeadline(Duration);

impl RequestDeadline {
    pub fn new(limit: Duration) -> Self {
        Self(limit)
    }

    pub fn limit(&self) -> Duration {
        self.0
    }
}

/// Runs the rest of the stack under the deadline.
///
/// Dropping the inner future releases any session lease it held without
/// storing anything further, so slots keep the values written before the
/// deadline passed.
pub async fn request_deadline_middleware(
    State(deadline): State<RequestDeadline>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match tokio::time::timeout(deadline.limit(), next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::error!(
                %method,
                %path,
                limit_ms = deadline.limit().as_millis() as u64,
                "Request exceeded deadline"
            );
            deadline_exceeded_response()
        }
    }
}

fn deadline_exceeded_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "status": "error",
            "message": INTERNAL_ERROR_MESSAGE,
        })),
    )
        .into_response()
}
