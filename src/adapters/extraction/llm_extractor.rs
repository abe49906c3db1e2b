//! LLM-backed country extractor.
//!
//! Sends the user's text (or passport image) to the AI provider with the
//! country extraction prompt and reads back a JSON object. Every failure
//! mode collapses to `UNKNOWN`:
//!
//! - provider errors and timeouts
//! - empty or non-JSON replies
//! - codes that are not exactly three letters

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::ai::prompts::COUNTRY_EXTRACTION_PROMPT;
use crate::adapters::ai::reply::parse_json_object;
use crate::domain::foundation::CountrySlot;
use crate::domain::intake::{ExtractionResult, ImageUpload};
use crate::ports::{AIError, AIProvider, CompletionRequest, CountryExtractor, Message};

const IMAGE_QUESTION: &str = "What country issued this passport?";
const PASSPORT_FIELD: &str = "passportCountry";
const DESTINATION_FIELD: &str = "destinationCountry";

/// Model and limit settings for extraction calls.
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    /// Model for text extraction.
    pub text_model: String,
    /// Model for image extraction (must accept images).
    pub vision_model: String,
    /// Upper bound for one extraction call.
    pub timeout: Duration,
    /// Completion token limit.
    pub max_tokens: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            text_model: "gpt-4o-mini".to_string(),
            vision_model: "gpt-4o".to_string(),
            timeout: Duration::from_secs(30),
            max_tokens: 300,
        }
    }
}

/// Country extractor that asks an LLM.
pub struct LlmCountryExtractor {
    provider: Arc<dyn AIProvider>,
    settings: ExtractionSettings,
}

impl LlmCountryExtractor {
    pub fn new(provider: Arc<dyn AIProvider>, settings: ExtractionSettings) -> Self {
        Self { provider, settings }
    }

    fn base_request(&self, model: &str) -> CompletionRequest {
        CompletionRequest::new()
            .with_system_prompt(COUNTRY_EXTRACTION_PROMPT)
            .with_model(model)
            .with_temperature(0.0)
            .with_max_tokens(self.settings.max_tokens)
    }

    /// Runs one completion under the extraction timeout.
    async fn ask(&self, request: CompletionRequest) -> Result<String, AIError> {
        match tokio::time::timeout(self.settings.timeout, self.provider.complete(request)).await {
            Ok(result) => result.map(|response| response.content),
            Err(_) => Err(AIError::Timeout {
                timeout_secs: self.settings.timeout.as_secs() as u32,
            }),
        }
    }
}

/// Reads both slots from a model reply.
pub fn parse_extraction_reply(reply: &str) -> Option<ExtractionResult> {
    let map = parse_json_object(reply)?;
    let field = |name: &str| CountrySlot::coerce_opt(map.get(name).and_then(|v| v.as_str()));
    Some(ExtractionResult::new(
        field(PASSPORT_FIELD),
        field(DESTINATION_FIELD),
    ))
}

#[async_trait]
impl CountryExtractor for LlmCountryExtractor {
    async fn extract_from_text(&self, text: &str) -> ExtractionResult {
        let request = self
            .base_request(&self.settings.text_model)
            .with_message(Message::user(text));

        let reply = match self.ask(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Text extraction failed");
                return ExtractionResult::unknown();
            }
        };

        match parse_extraction_reply(&reply) {
            Some(result) => {
                tracing::debug!(
                    passport = %result.passport_country,
                    destination = %result.destination_country,
                    "Text extraction result"
                );
                result
            }
            None => {
                tracing::warn!(reply = %reply, "Non-JSON reply from text extraction");
                ExtractionResult::unknown()
            }
        }
    }

    async fn extract_from_image(&self, image: &ImageUpload) -> CountrySlot {
        let request = self
            .base_request(&self.settings.vision_model)
            .with_message(Message::user_with_image(
                IMAGE_QUESTION,
                image.media_type,
                image.bytes.clone(),
            ));

        let reply = match self.ask(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Image extraction failed");
                return CountrySlot::Unknown;
            }
        };

        match parse_extraction_reply(&reply) {
            Some(result) => {
                tracing::debug!(passport = %result.passport_country, "Image extraction result");
                result.passport_country
            }
            None => {
                tracing::warn!(reply = %reply, "Non-JSON reply from image extraction");
                CountrySlot::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::intake::ImageUploadPolicy;
    use crate::ports::ContentPart;

    fn extractor(provider: MockAIProvider) -> LlmCountryExtractor {
        LlmCountryExtractor::new(Arc::new(provider), ExtractionSettings::default())
    }

    fn image() -> ImageUpload {
        ImageUploadPolicy::default()
            .accept(vec![1, 2, 3], Some("passport.png"), None)
            .unwrap()
    }

    #[test]
    fn parse_reply_reads_both_fields() {
        let result =
            parse_extraction_reply(r#"{"passportCountry":"FRA","destinationCountry":"JPN"}"#)
                .unwrap();
        assert_eq!(result.passport_country.as_str(), "FRA");
        assert_eq!(result.destination_country.as_str(), "JPN");
    }

    #[test]
    fn parse_reply_coerces_bad_codes() {
        let result = parse_extraction_reply(
            r#"{"passportCountry":"France","destinationCountry":42}"#,
        )
        .unwrap();
        assert_eq!(result, ExtractionResult::unknown());
    }

    #[tokio::test]
    async fn text_extraction_parses_fenced_reply() {
        let provider = MockAIProvider::new()
            .with_response("```json\n{\"passportCountry\": \"fra\", \"destinationCountry\": \"JPN\"}\n```");
        let extractor = extractor(provider.clone());

        let result = extractor
            .extract_from_text("I'm from France going to Japan")
            .await;

        assert_eq!(result.passport_country.as_str(), "FRA");
        assert_eq!(result.destination_country.as_str(), "JPN");

        let call = &provider.get_calls()[0];
        assert_eq!(call.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(call.temperature, Some(0.0));
        assert_eq!(call.system_prompt.as_deref(), Some(COUNTRY_EXTRACTION_PROMPT));
    }

    #[tokio::test]
    async fn text_extraction_degrades_on_prose() {
        let extractor = extractor(MockAIProvider::new().with_response("You are French."));
        let result = extractor.extract_from_text("I'm French").await;
        assert_eq!(result, ExtractionResult::unknown());
    }

    #[tokio::test]
    async fn text_extraction_degrades_on_provider_error() {
        let extractor = extractor(MockAIProvider::new().with_error(MockError::Network {
            message: "reset".to_string(),
        }));
        let result = extractor.extract_from_text("I'm French").await;
        assert_eq!(result, ExtractionResult::unknown());
    }

    #[tokio::test]
    async fn text_extraction_degrades_on_timeout() {
        let provider = MockAIProvider::new()
            .with_response(r#"{"passportCountry":"FRA"}"#)
            .with_delay(Duration::from_millis(200));
        let extractor = LlmCountryExtractor::new(
            Arc::new(provider),
            ExtractionSettings {
                timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );

        let result = extractor.extract_from_text("I'm French").await;
        assert_eq!(result, ExtractionResult::unknown());
    }

    #[tokio::test]
    async fn image_extraction_sends_image_to_vision_model() {
        let provider = MockAIProvider::new().with_response(r#"{"passportCountry":"USA"}"#);
        let extractor = extractor(provider.clone());

        let passport = extractor.extract_from_image(&image()).await;

        assert_eq!(passport.as_str(), "USA");
        let call = &provider.get_calls()[0];
        assert_eq!(call.model.as_deref(), Some("gpt-4o"));
        assert!(matches!(
            &call.messages[0].parts[1],
            ContentPart::Image { media_type, .. } if media_type == "image/png"
        ));
    }

    #[tokio::test]
    async fn image_extraction_rejects_long_codes() {
        let extractor =
            extractor(MockAIProvider::new().with_response(r#"{"passportCountry":"USAA"}"#));
        assert_eq!(
            extractor.extract_from_image(&image()).await,
            CountrySlot::Unknown
        );
    }
}
