//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port plus prompt and reply helpers.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `OpenAIProvider` - OpenAI chat completions (text and vision)

mod mock_provider;
mod openai_provider;
pub mod prompts;
pub mod reply;

pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
