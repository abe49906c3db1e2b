//! Mock visa resolver for controller and HTTP tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::foundation::CountryCode;
use crate::ports::{ResolutionError, VisaResolver};

/// Scripted resolver.
///
/// Answers "Visa rules for <P> to <D>." unless a failure is queued.
#[derive(Debug, Clone, Default)]
pub struct MockVisaResolver {
    failures: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<Mutex<Vec<(CountryCode, CountryCode)>>>,
    delay: Duration,
}

impl MockVisaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call fail with `ResolutionError::Unavailable(reason)`.
    pub fn with_failure(self, reason: impl Into<String>) -> Self {
        self.failures.lock().unwrap().push_back(reason.into());
        self
    }

    /// Delays every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<(CountryCode, CountryCode)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VisaResolver for MockVisaResolver {
    async fn resolve(
        &self,
        passport: &CountryCode,
        destination: &CountryCode,
    ) -> Result<String, ResolutionError> {
        self.calls.lock().unwrap().push((*passport, *destination));
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        if let Some(reason) = self.failures.lock().unwrap().pop_front() {
            return Err(ResolutionError::Unavailable(reason));
        }
        Ok(format!("Visa rules for {} to {}.", passport, destination))
    }
}
