//! HTTP middleware for axum.
//!
//! - `request_deadline` - Whole-request deadline with a JSON error body
//! - `session_cookie` - Signed session cookie middleware and extractor

pub mod request_deadline;
pub mod session_cookie;

pub use request_deadline::{request_deadline_middleware, RequestDeadline};
pub use session_cookie::{
    session_cookie_middleware, CurrentSession, SessionCookieSigner, SessionCookieState,
    SessionKeyError, SessionRejection, SESSION_COOKIE_NAME,
};
