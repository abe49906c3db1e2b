//! Mock country extractor for controller and HTTP tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::foundation::CountrySlot;
use crate::domain::intake::{ExtractionResult, ImageUpload};
use crate::ports::CountryExtractor;

/// Scripted extractor.
///
/// Text and image results are queued separately and consumed in order;
/// an exhausted queue yields `UNKNOWN`.
#[derive(Debug, Clone, Default)]
pub struct MockCountryExtractor {
    text_results: Arc<Mutex<VecDeque<ExtractionResult>>>,
    image_results: Arc<Mutex<VecDeque<CountrySlot>>>,
    text_calls: Arc<Mutex<Vec<String>>>,
    image_calls: Arc<Mutex<usize>>,
    delay: Duration,
}

impl MockCountryExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a text result from raw codes (`UNKNOWN` allowed).
    pub fn with_text(self, passport: &str, destination: &str) -> Self {
        self.text_results.lock().unwrap().push_back(ExtractionResult::new(
            CountrySlot::coerce(passport),
            CountrySlot::coerce(destination),
        ));
        self
    }

    /// Queues an image result.
    pub fn with_image(self, passport: &str) -> Self {
        self.image_results
            .lock()
            .unwrap()
            .push_back(CountrySlot::coerce(passport));
        self
    }

    /// Delays every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Texts passed to `extract_from_text`, in order.
    pub fn text_calls(&self) -> Vec<String> {
        self.text_calls.lock().unwrap().clone()
    }

    /// Number of `extract_from_image` calls.
    pub fn image_call_count(&self) -> usize {
        *self.image_calls.lock().unwrap()
    }
}

#[async_trait]
impl CountryExtractor for MockCountryExtractor {
    async fn extract_from_text(&self, text: &str) -> ExtractionResult {
        self.text_calls.lock().unwrap().push(text.to_string());
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.text_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
    }

    async fn extract_from_image(&self, _image: &ImageUpload) -> CountrySlot {
        *self.image_calls.lock().unwrap() += 1;
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.image_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
    }
}
