//! Scope Responder Port - replies to greetings and out-of-scope messages.

use async_trait::async_trait;

use super::AIError;

/// Port for answering messages that carry no country information.
#[async_trait]
pub trait ScopeResponder: Send + Sync {
    /// Produces a reply that greets the user or steers them back to visa questions.
    async fn respond(&self, text: &str) -> Result<String, AIError>;
}
