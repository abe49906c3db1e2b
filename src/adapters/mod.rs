//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI chat completions, prompts, reply parsing
//! - `extraction` - Country extraction from text and passport images
//! - `visa` - Visa table lookup with estimation fallback
//! - `scope` - Greeting and out-of-scope replies
//! - `session` - Session slot storage
//! - `http` - Axum routes, handlers and session cookie middleware

pub mod ai;
pub mod extraction;
pub mod http;
pub mod scope;
pub mod session;
pub mod visa;
