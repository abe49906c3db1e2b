//! Country Extractor Port - turns free text or a document image into slot guesses.
//!
//! Implementations must never fail: network errors, timeouts and malformed
//! model output all come back as `UNKNOWN` slots.

use async_trait::async_trait;

use crate::domain::foundation::CountrySlot;
use crate::domain::intake::{ExtractionResult, ImageUpload};

/// Port for best-effort country extraction.
#[async_trait]
pub trait CountryExtractor: Send + Sync {
    /// Extracts passport and destination countries from user text.
    async fn extract_from_text(&self, text: &str) -> ExtractionResult;

    /// Extracts the issuing country from a passport image.
    async fn extract_from_image(&self, image: &ImageUpload) -> CountrySlot;
}
