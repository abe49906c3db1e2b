//! Mock scope responder for controller and HTTP tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::ports::{AIError, ScopeResponder};

/// Fixed-reply scope responder.
#[derive(Debug, Clone)]
pub struct MockScopeResponder {
    reply: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for MockScopeResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScopeResponder {
    pub fn new() -> Self {
        Self {
            reply: Some("Hello! I can help with visa requirements.".to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    /// Makes every call fail.
    pub fn failing() -> Self {
        Self {
            reply: None,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScopeResponder for MockScopeResponder {
    async fn respond(&self, text: &str) -> Result<String, AIError> {
        self.calls.lock().unwrap().push(text.to_string());
        self.reply
            .clone()
            .ok_or_else(|| AIError::unavailable("mock responder failure"))
    }
}
