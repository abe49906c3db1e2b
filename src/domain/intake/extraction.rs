//! Per-request extraction evidence.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CountrySlot;

/// Best-effort guess produced by one extractor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    #[serde(default)]
    pub passport_country: CountrySlot,
    #[serde(default)]
    pub destination_country: CountrySlot,
}

impl ExtractionResult {
    pub fn new(passport_country: CountrySlot, destination_country: CountrySlot) -> Self {
        Self {
            passport_country,
            destination_country,
        }
    }

    /// Result carrying nothing.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Result from a document image, which can only name a passport.
    pub fn passport_only(passport_country: CountrySlot) -> Self {
        Self::new(passport_country, CountrySlot::Unknown)
    }
}

/// Evidence gathered during one request, buffered before reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestEvidence {
    /// Result of the image extractor, if an image was processed.
    pub image: Option<ExtractionResult>,
    /// Result of the text extractor, if text was processed.
    pub text: Option<ExtractionResult>,
}

impl RequestEvidence {
    pub fn new(image: Option<ExtractionResult>, text: Option<ExtractionResult>) -> Self {
        Self { image, text }
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.text.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passport_only_leaves_destination_unknown() {
        let result = ExtractionResult::passport_only(CountrySlot::coerce("USA"));
        assert_eq!(result.passport_country.as_str(), "USA");
        assert!(result.destination_country.is_unknown());
    }

    #[test]
    fn deserializes_model_shape_with_coercion() {
        let json = r#"{"passportCountry": "fra", "destinationCountry": "Japan"}"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.passport_country.as_str(), "FRA");
        assert!(result.destination_country.is_unknown());
    }

    #[test]
    fn deserializes_missing_fields_as_unknown() {
        let result: ExtractionResult = serde_json::from_str("{}").unwrap();
        assert_eq!(result, ExtractionResult::unknown());
    }

    #[test]
    fn evidence_is_empty_without_results() {
        assert!(RequestEvidence::default().is_empty());
        assert!(!RequestEvidence::new(None, Some(ExtractionResult::unknown())).is_empty());
    }
}
