//! Country extractor adapters.
//!
//! - `LlmCountryExtractor` - asks the AI provider, degrades to UNKNOWN
//! - `MockCountryExtractor` - scripted results for tests

mod llm_extractor;
mod mock_extractor;

pub use llm_extractor::{parse_extraction_reply, ExtractionSettings, LlmCountryExtractor};
pub use mock_extractor::MockCountryExtractor;
