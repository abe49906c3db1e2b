//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `AIProvider` - Chat completions (text and vision)
//! - `CountryExtractor` - Best-effort passport/destination extraction
//! - `VisaResolver` - Visa requirement lookup with estimation fallback
//! - `ScopeResponder` - Greeting and out-of-scope replies
//!
//! ## State Ports
//!
//! - `SessionStore` - Per-session slot storage with exclusive leases

mod ai_provider;
mod country_extractor;
mod scope_responder;
mod session_store;
mod visa_resolver;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, ContentPart, Message, TokenUsage,
};
pub use country_extractor::CountryExtractor;
pub use scope_responder::ScopeResponder;
pub use session_store::{SessionLease, SessionRecord, SessionStore, SessionStoreError};
pub use visa_resolver::{ResolutionError, VisaResolver};
