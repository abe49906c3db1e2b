//! Integration tests for the intake HTTP endpoint.
//!
//! These tests drive the full router (session cookie, body parsing,
//! controller, status mapping) with mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use visa_sherpa::adapters::extraction::MockCountryExtractor;
use visa_sherpa::adapters::http::{
    intake_router, with_service_layers, IntakeAppState, ServiceLayers, SessionCookieSigner,
};
use visa_sherpa::adapters::scope::MockScopeResponder;
use visa_sherpa::adapters::session::InMemorySessionStore;
use visa_sherpa::adapters::visa::MockVisaResolver;
use visa_sherpa::application::{AnalyzeMessageHandler, AnalyzeMessageSettings};
use visa_sherpa::domain::intake::{ImageUploadPolicy, INTERNAL_ERROR_MESSAGE};

// =============================================================================
// Test Infrastructure
// =============================================================================

const BOUNDARY: &str = "visa-sherpa-test-boundary";

struct TestApp {
    router: Router,
    extractor: MockCountryExtractor,
    resolver: MockVisaResolver,
}

impl TestApp {
    fn new(extractor: MockCountryExtractor) -> Self {
        Self::with_resolver(extractor, MockVisaResolver::new())
    }

    fn with_resolver(extractor: MockCountryExtractor, resolver: MockVisaResolver) -> Self {
        Self::build(
            extractor,
            resolver,
            InMemorySessionStore::default(),
            AnalyzeMessageSettings::default(),
            None,
        )
    }

    /// Router wrapped in the same service layers the binary uses.
    fn build(
        extractor: MockCountryExtractor,
        resolver: MockVisaResolver,
        sessions: InMemorySessionStore,
        settings: AnalyzeMessageSettings,
        layers: Option<ServiceLayers>,
    ) -> Self {
        let handler = AnalyzeMessageHandler::new(
            Arc::new(extractor.clone()),
            Arc::new(resolver.clone()),
            Arc::new(MockScopeResponder::new().with_reply("Hello! Where are you travelling?")),
            Arc::new(sessions),
            settings,
        );
        let policy = ImageUploadPolicy {
            max_bytes: 1024,
            ..Default::default()
        };
        let mut router = intake_router(
            IntakeAppState::new(Arc::new(handler), policy),
            SessionCookieSigner::new("integration-secret").unwrap(),
        );
        if let Some(layers) = layers {
            router = with_service_layers(router, &layers);
        }
        Self {
            router,
            extractor,
            resolver,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cookie, serde_json::from_slice(&bytes).unwrap())
    }
}

fn json_request(message: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/analyze-message")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(json!({ "message": message }).to_string()))
        .unwrap()
}

fn multipart_request(message: Option<&str>, image: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(message) = message {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\n{message}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/analyze-message")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// =============================================================================
// Single-turn flows
// =============================================================================

#[tokio::test]
async fn both_countries_in_one_message_complete() {
    let app = TestApp::new(MockCountryExtractor::new().with_text("FRA", "JPN"));

    let (status, cookie, body) = app
        .send(json_request("I'm from France going to Japan", None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(cookie.unwrap().starts_with("visa_sherpa_session="));
    assert_eq!(
        body,
        json!({
            "status": "complete",
            "message": "Thank you for the information. Visa rules for FRA to JPN.",
            "passportCountry": "FRA",
            "destinationCountry": "JPN"
        })
    );
}

#[tokio::test]
async fn empty_body_gets_fixed_greeting() {
    let app = TestApp::new(MockCountryExtractor::new());

    let request = Request::builder()
        .method("POST")
        .uri("/analyze-message")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "complete",
            "message": "Could you please share your passport country and destination?"
        })
    );
    assert!(app.extractor.text_calls().is_empty());
}

#[tokio::test]
async fn greeting_uses_scope_responder() {
    let app = TestApp::new(MockCountryExtractor::new());

    let (_, _, body) = app.send(json_request("hello", None)).await;

    assert_eq!(body["status"], "complete");
    assert_eq!(body["message"], "Hello! Where are you travelling?");
    assert!(body.get("passportCountry").is_none());
}

// =============================================================================
// Multi-turn flows (session cookie)
// =============================================================================

#[tokio::test]
async fn slots_accumulate_across_requests_with_cookie() {
    let app = TestApp::new(
        MockCountryExtractor::new()
            .with_text("FRA", "UNKNOWN")
            .with_text("UNKNOWN", "JPN"),
    );

    let (status, cookie, body) = app.send(json_request("I'm French", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "incomplete",
            "message": "Could you clarify your destination country?",
            "passportCountry": "FRA",
            "destinationCountry": null
        })
    );

    let cookie = cookie.expect("first response sets the session cookie");
    let (status, second_cookie, body) = app
        .send(json_request("going to Japan", Some(&cookie)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(second_cookie.is_none());
    assert_eq!(body["status"], "complete");
    assert_eq!(body["passportCountry"], "FRA");
    assert_eq!(body["destinationCountry"], "JPN");
}

#[tokio::test]
async fn requests_without_cookie_do_not_share_state() {
    let app = TestApp::new(
        MockCountryExtractor::new()
            .with_text("FRA", "UNKNOWN")
            .with_text("UNKNOWN", "JPN"),
    );

    app.send(json_request("I'm French", None)).await;
    let (_, _, body) = app.send(json_request("going to Japan", None)).await;

    assert_eq!(
        body,
        json!({
            "status": "incomplete",
            "message": "Could you please specify your passport issuer?",
            "passportCountry": null,
            "destinationCountry": "JPN"
        })
    );
}

#[tokio::test]
async fn resolver_failure_is_bad_gateway_and_keeps_session() {
    let app = TestApp::with_resolver(
        MockCountryExtractor::new().with_text("FRA", "JPN"),
        MockVisaResolver::new().with_failure("estimation service down"),
    );

    let (status, cookie, body) = app.send(json_request("France to Japan", None)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "Could not check visa requirements: visa data unavailable: estimation service down"
    );

    // Nothing new is extracted; the kept pair resolves on retry.
    let (status, _, body) = app
        .send(json_request("please retry", Some(&cookie.unwrap())))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "complete");
    assert_eq!(app.resolver.call_count(), 2);
}

#[tokio::test]
async fn greetings_without_cookie_do_not_use_up_session_capacity() {
    let app = TestApp::build(
        MockCountryExtractor::new()
            .with_text("UNKNOWN", "UNKNOWN")
            .with_text("UNKNOWN", "UNKNOWN")
            .with_text("UNKNOWN", "UNKNOWN")
            .with_text("FRA", "JPN"),
        MockVisaResolver::new(),
        InMemorySessionStore::new(2),
        AnalyzeMessageSettings::default(),
        None,
    );

    for _ in 0..3 {
        let (status, _, body) = app.send(json_request("hi", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Hello! Where are you travelling?");
    }

    let (status, _, body) = app.send(json_request("France to Japan", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "complete");
    assert_eq!(body["passportCountry"], "FRA");
}

// =============================================================================
// Service layers
// =============================================================================

#[tokio::test]
async fn request_past_deadline_gets_internal_error_body() {
    let app = TestApp::build(
        MockCountryExtractor::new()
            .with_text("FRA", "JPN")
            .with_delay(Duration::from_millis(70)),
        MockVisaResolver::new().with_delay(Duration::from_millis(70)),
        InMemorySessionStore::default(),
        AnalyzeMessageSettings {
            call_timeout: Duration::from_millis(100),
        },
        Some(ServiceLayers {
            request_timeout: Duration::from_millis(100),
            cors_origins: Vec::new(),
        }),
    );

    let (status, _, body) = app.send(json_request("France to Japan", None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "status": "error",
            "message": INTERNAL_ERROR_MESSAGE
        })
    );
}

#[tokio::test]
async fn request_within_deadline_passes_through_service_layers() {
    let app = TestApp::build(
        MockCountryExtractor::new()
            .with_text("FRA", "JPN")
            .with_delay(Duration::from_millis(20)),
        MockVisaResolver::new().with_delay(Duration::from_millis(20)),
        InMemorySessionStore::default(),
        AnalyzeMessageSettings {
            call_timeout: Duration::from_millis(200),
        },
        Some(ServiceLayers {
            request_timeout: Duration::from_secs(2),
            cors_origins: Vec::new(),
        }),
    );

    let (status, _, body) = app.send(json_request("France to Japan", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "complete");
}

// =============================================================================
// Multipart uploads
// =============================================================================

#[tokio::test]
async fn image_passport_wins_over_text() {
    let app = TestApp::new(
        MockCountryExtractor::new()
            .with_image("USA")
            .with_text("DEU", "UNKNOWN"),
    );

    let (status, _, body) = app
        .send(multipart_request(
            Some("I'm from Germany"),
            Some(("passport.png", &[0x89, 0x50, 0x4E, 0x47])),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "incomplete");
    assert_eq!(body["passportCountry"], "USA");
    assert_eq!(app.extractor.image_call_count(), 1);
}

#[tokio::test]
async fn unsupported_image_is_ignored() {
    let app = TestApp::new(MockCountryExtractor::new().with_text("UNKNOWN", "JPN"));

    let (status, _, body) = app
        .send(multipart_request(
            Some("Going to Japan"),
            Some(("passport.gif", b"GIF89a")),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "incomplete");
    assert_eq!(body["destinationCountry"], "JPN");
    assert_eq!(app.extractor.image_call_count(), 0);
}

#[tokio::test]
async fn oversized_image_is_ignored() {
    let app = TestApp::new(MockCountryExtractor::new());
    let big = vec![0u8; 2048];

    let (status, _, body) = app
        .send(multipart_request(None, Some(("passport.jpg", &big))))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Could you please share your passport country and destination?"
    );
    assert_eq!(app.extractor.image_call_count(), 0);
}

#[tokio::test]
async fn health_check_responds() {
    let app = TestApp::new(MockCountryExtractor::new());

    let (status, cookie, body) = app
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_none());
    assert_eq!(body, json!({"status": "ok"}));
}
