//! AnalyzeMessageHandler - runs one intake request end to end.
//!
//! 1. Extract from image and text concurrently (failures become UNKNOWN)
//! 2. Lock the session and reconcile the buffered evidence
//! 3. Greet, ask for the missing slot, or resolve and clear
//!
//! The session lease is held from reconciliation until the outcome is
//! decided, so requests for one session never interleave.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{CountryCode, CountrySlot, SessionKey};
use crate::domain::intake::{
    reconcile_evidence, EvidenceSource, ExtractionResult, ImageUpload, IntakeOutcome, NextStep,
    RequestEvidence, SlotChanges, ASK_BOTH_PROMPT,
};
use crate::ports::{
    CountryExtractor, ResolutionError, ScopeResponder, SessionLease, SessionStore,
    SessionStoreError, VisaResolver,
};

/// Command for one intake request.
#[derive(Debug, Clone)]
pub struct AnalyzeMessageCommand {
    pub session_key: SessionKey,
    /// Raw message text; blank text counts as absent.
    pub message: Option<String>,
    /// Image that already passed the upload policy.
    pub image: Option<ImageUpload>,
}

impl AnalyzeMessageCommand {
    pub fn new(session_key: SessionKey) -> Self {
        Self {
            session_key,
            message: None,
            image: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    /// Trimmed text, if any is left.
    fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Errors that end a request with the generic internal error.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeMessageError {
    #[error("session store: {0}")]
    Session(#[from] SessionStoreError),
}

/// Handler limits.
#[derive(Debug, Clone)]
pub struct AnalyzeMessageSettings {
    /// Upper bound for each extractor, responder and resolver call.
    pub call_timeout: Duration,
}

impl Default for AnalyzeMessageSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
        }
    }
}

/// Handler for `POST /analyze-message`.
pub struct AnalyzeMessageHandler {
    extractor: Arc<dyn CountryExtractor>,
    resolver: Arc<dyn VisaResolver>,
    responder: Arc<dyn ScopeResponder>,
    sessions: Arc<dyn SessionStore>,
    settings: AnalyzeMessageSettings,
}

impl AnalyzeMessageHandler {
    pub fn new(
        extractor: Arc<dyn CountryExtractor>,
        resolver: Arc<dyn VisaResolver>,
        responder: Arc<dyn ScopeResponder>,
        sessions: Arc<dyn SessionStore>,
        settings: AnalyzeMessageSettings,
    ) -> Self {
        Self {
            extractor,
            resolver,
            responder,
            sessions,
            settings,
        }
    }

    /// Runs the request. Never fails: faults become `IntakeOutcome::internal_error`.
    pub async fn handle(&self, cmd: AnalyzeMessageCommand) -> IntakeOutcome {
        let session = cmd.session_key;
        let outcome = match AssertUnwindSafe(self.run(cmd)).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                tracing::error!(%session, error = %err, "Intake request failed");
                IntakeOutcome::internal_error()
            }
            Err(panic) => {
                tracing::error!(%session, panic = panic_message(&*panic), "Intake request panicked");
                IntakeOutcome::internal_error()
            }
        };
        tracing::info!(%session, outcome = outcome.label(), "Intake request handled");
        outcome
    }

    async fn run(&self, cmd: AnalyzeMessageCommand) -> Result<IntakeOutcome, AnalyzeMessageError> {
        let text = cmd.text();
        let evidence = self.gather(text, cmd.image.as_ref()).await;

        let mut lease = self.sessions.acquire(&cmd.session_key).await?;
        let reconciled = reconcile_evidence(lease.state(), evidence);
        log_changes(&cmd.session_key, &reconciled.changes);
        lease.store(reconciled.state);

        let step = NextStep::for_state(&reconciled.state);
        let outcome = match step {
            NextStep::Greet => IntakeOutcome::Greeting {
                message: self.greet(text).await,
            },
            NextStep::AskPassport { .. } | NextStep::AskDestination { .. } => {
                IntakeOutcome::incomplete(step).unwrap_or_else(IntakeOutcome::internal_error)
            }
            NextStep::Resolve {
                passport,
                destination,
            } => self.complete(&mut lease, passport, destination).await,
        };
        Ok(outcome)
    }

    /// Runs both extractors concurrently and buffers their results.
    async fn gather(&self, text: Option<&str>, image: Option<&ImageUpload>) -> RequestEvidence {
        let from_image = async {
            match image {
                Some(image) => Some(ExtractionResult::passport_only(
                    self.extract_image(image).await,
                )),
                None => None,
            }
        };
        let from_text = async {
            match text {
                Some(text) => Some(self.extract_text(text).await),
                None => None,
            }
        };

        let (image, text) = futures::join!(from_image, from_text);
        RequestEvidence::new(image, text)
    }

    async fn extract_image(&self, image: &ImageUpload) -> CountrySlot {
        let call = self.extractor.extract_from_image(image);
        match tokio::time::timeout(self.settings.call_timeout, call).await {
            Ok(slot) => slot,
            Err(_) => {
                tracing::warn!(file = ?image.file_name, "Image extraction timed out");
                CountrySlot::Unknown
            }
        }
    }

    async fn extract_text(&self, text: &str) -> ExtractionResult {
        let call = self.extractor.extract_from_text(text);
        match tokio::time::timeout(self.settings.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Text extraction timed out");
                ExtractionResult::unknown()
            }
        }
    }

    /// Greeting or out-of-scope reply; falls back to the fixed prompt.
    async fn greet(&self, text: Option<&str>) -> String {
        let Some(text) = text else {
            return ASK_BOTH_PROMPT.to_string();
        };
        let call = self.responder.respond(text);
        match tokio::time::timeout(self.settings.call_timeout, call).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "Scope responder failed");
                ASK_BOTH_PROMPT.to_string()
            }
            Err(_) => {
                tracing::warn!("Scope responder timed out");
                ASK_BOTH_PROMPT.to_string()
            }
        }
    }

    /// Resolves the pair and clears the session only on success.
    async fn complete(
        &self,
        lease: &mut SessionLease,
        passport: CountryCode,
        destination: CountryCode,
    ) -> IntakeOutcome {
        let call = self.resolver.resolve(&passport, &destination);
        let resolved = match tokio::time::timeout(self.settings.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ResolutionError::Timeout {
                timeout_secs: self.settings.call_timeout.as_secs(),
            }),
        };

        match resolved {
            Ok(message) => {
                lease.clear();
                tracing::info!(
                    session = %lease.key(),
                    %passport,
                    %destination,
                    "Visa requirement resolved, session cleared"
                );
                IntakeOutcome::complete(&message, passport, destination)
            }
            Err(err) => {
                tracing::warn!(
                    session = %lease.key(),
                    %passport,
                    %destination,
                    error = %err,
                    "Visa resolution failed, keeping session"
                );
                IntakeOutcome::resolution_failed(err)
            }
        }
    }
}

fn log_changes(session: &SessionKey, changes: &SlotChanges) {
    if let Some(change) = changes.passport {
        if change.source == EvidenceSource::Image && change.from.is_known() {
            tracing::info!(
                %session,
                from = %change.from,
                to = %change.to,
                "Passport from image replaced stored passport"
            );
        } else {
            tracing::debug!(%session, to = %change.to, source = change.source.as_str(), "Passport updated");
        }
    }
    if let Some(change) = changes.destination {
        tracing::debug!(%session, from = %change.from, to = %change.to, "Destination updated");
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
