//! LLM-backed greeting and scope responder.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::ai::prompts::GREETING_AND_SCOPE_PROMPT;
use crate::ports::{AIError, AIProvider, CompletionRequest, Message, ScopeResponder};

/// Scope responder that asks the AI provider with the greeting prompt.
pub struct LlmScopeResponder {
    provider: Arc<dyn AIProvider>,
    model: String,
    timeout: Duration,
}

impl LlmScopeResponder {
    pub fn new(provider: Arc<dyn AIProvider>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ScopeResponder for LlmScopeResponder {
    async fn respond(&self, text: &str) -> Result<String, AIError> {
        let request = CompletionRequest::new()
            .with_system_prompt(GREETING_AND_SCOPE_PROMPT)
            .with_model(&self.model)
            .with_max_tokens(200)
            .with_message(Message::user(text));

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| AIError::Timeout {
                timeout_secs: self.timeout.as_secs() as u32,
            })??;

        let reply = response.content.trim();
        if reply.is_empty() {
            return Err(AIError::parse("empty scope reply"));
        }
        Ok(reply.to_string())
    }
}
