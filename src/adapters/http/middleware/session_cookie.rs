//! Signed session cookie middleware and extractor.
//!
//! The cookie value is `<uuid>.<hex hmac-sha256(uuid)>`. The middleware
//! verifies it, and on a missing or tampered cookie mints a fresh key and
//! appends `Set-Cookie` to the response.
//!
//! ```text
//! Request → session_cookie_middleware → injects SessionKey into extensions
//!                                              ↓
//!                                    Handler → CurrentSession extractor
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::SessionKey;

type HmacSha256 = Hmac<Sha256>;

/// Cookie name carrying the session key.
pub const SESSION_COOKIE_NAME: &str = "visa_sherpa_session";

/// Error building a cookie signer.
#[derive(Debug, thiserror::Error)]
#[error("invalid session signing key: {0}")]
pub struct SessionKeyError(String);

/// HMAC signer for session cookies.
#[derive(Clone)]
pub struct SessionCookieSigner {
    mac: HmacSha256,
    secure: bool,
}

impl std::fmt::Debug for SessionCookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookieSigner")
            .field("mac", &"[REDACTED]")
            .field("secure", &self.secure)
            .finish()
    }
}

impl SessionCookieSigner {
    pub fn new(secret: &str) -> Result<Self, SessionKeyError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| SessionKeyError(e.to_string()))?;
        Ok(Self { mac, secure: false })
    }

    /// Adds the `Secure` attribute to issued cookies.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    fn signature(&self, key: &SessionKey) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(key.to_string().as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// Cookie value for `key`.
    pub fn sign(&self, key: &SessionKey) -> String {
        format!("{}.{}", key, hex_encode(&self.signature(key)))
    }

    /// Returns the key if the value carries a valid signature.
    pub fn verify(&self, value: &str) -> Option<SessionKey> {
        let (raw_key, raw_signature) = value.split_once('.')?;
        let key: SessionKey = raw_key.parse().ok()?;
        let provided = hex_decode(raw_signature)?;
        let expected = self.signature(&key);
        if expected.as_slice().ct_eq(&provided).unwrap_u8() != 1 {
            return None;
        }
        Some(key)
    }

    /// Full `Set-Cookie` header value for `key`.
    pub fn set_cookie_header(&self, key: &SessionKey) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE_NAME,
            self.sign(key)
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Finds the session cookie value in a `Cookie` header.
fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// Session middleware state.
pub type SessionCookieState = Arc<SessionCookieSigner>;

/// Middleware that resolves the caller's session key.
///
/// Every cookie header is checked so a stale cookie next to a valid one
/// still resolves.
pub async fn session_cookie_middleware(
    State(signer): State<SessionCookieState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| find_cookie(value, SESSION_COOKIE_NAME))
        .find_map(|value| signer.verify(value));

    let (key, issued) = match existing {
        Some(key) => (key, false),
        None => (SessionKey::new(), true),
    };
    if issued {
        tracing::debug!(session = %key, "Issued new session");
    }

    request.extensions_mut().insert(key);
    let mut response = next.run(request).await;

    if issued {
        match HeaderValue::from_str(&signer.set_cookie_header(&key)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Failed to build session cookie"),
        }
    }
    response
}

/// Extractor for the session key injected by [`session_cookie_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentSession(pub SessionKey);

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionKey>()
            .copied()
            .map(CurrentSession)
            .ok_or(SessionRejection::MissingMiddleware)
    }
}

/// Rejection when the session middleware was not installed.
#[derive(Debug, Clone)]
pub enum SessionRejection {
    MissingMiddleware,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        tracing::error!("Session middleware missing from router");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "status": "error",
                "message": crate::domain::intake::INTERNAL_ERROR_MESSAGE,
            })),
        )
            .into_response()
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
