//! Scope responder adapters.

mod llm_responder;
mod mock_responder;

pub use llm_responder::LlmScopeResponder;
pub use mock_responder::MockScopeResponder;
