//! Outer service layers shared by the binary and router tests.
//!
//! Layer order, outermost first: trace, CORS, request deadline, panic
//! catcher. Every failure the outer layers produce uses the intake error
//! body `{"status":"error","message":...}`.

use std::time::Duration;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::{request_deadline_middleware, RequestDeadline};
use crate::config::ServerConfig;
use crate::domain::intake::INTERNAL_ERROR_MESSAGE;

/// Settings for [`with_service_layers`].
#[derive(Debug, Clone)]
pub struct ServiceLayers {
    pub request_timeout: Duration,
    pub cors_origins: Vec<String>,
}

impl ServiceLayers {
    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            request_timeout: server.request_timeout(),
            cors_origins: server.cors_origins_list(),
        }
    }
}

/// Wraps the application router in the serving stack.
pub fn with_service_layers(router: Router, layers: &ServiceLayers) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn_with_state(
            RequestDeadline::new(layers.request_timeout),
            request_deadline_middleware,
        ))
        .layer(cors_layer(&layers.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(configured: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = configured
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::new();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

fn panic_response(_panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "status": "error",
            "message": INTERNAL_ERROR_MESSAGE,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::routing::get;
    use tower::ServiceExt;

    fn layers() -> ServiceLayers {
        ServiceLayers {
            request_timeout: Duration::from_secs(5),
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }

    async fn boom() -> &'static str {
        panic!("handler failure")
    }

    #[tokio::test]
    async fn panicking_route_returns_json_error() {
        let router = Router::new().route("/boom", get(boom));

        let response = with_service_layers(router, &layers())
            .oneshot(axum::http::Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn configured_origin_is_allowed_with_credentials() {
        let router = Router::new().route("/health", get(|| async { "ok" }));

        let response = with_service_layers(router, &layers())
            .oneshot(
                axum::http::Request::get("/health")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[test]
    fn from_config_reads_timeout_and_origins() {
        let server = ServerConfig {
            request_timeout_secs: 75,
            cors_origins: Some("http://a.test, http://b.test".to_string()),
            ..Default::default()
        };

        let layers = ServiceLayers::from_config(&server);
        assert_eq!(layers.request_timeout, Duration::from_secs(75));
        assert_eq!(layers.cors_origins.len(), 2);
    }
}
