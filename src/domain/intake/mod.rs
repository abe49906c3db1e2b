//! Intake module - the two-slot passport/destination protocol.
//!
//! - `SessionState` - the slots remembered across requests
//! - `ExtractionResult` / `RequestEvidence` - what one request observed
//! - `reconcile` - pure merge of evidence into state
//! - `NextStep` / `IntakeOutcome` - the per-request decision table

mod extraction;
mod image;
mod outcome;
mod reconcile;
mod session_state;

pub use extraction::{ExtractionResult, RequestEvidence};
pub use image::{ImageRejection, ImageUpload, ImageUploadPolicy};
pub use outcome::{
    FailureKind, IntakeOutcome, NextStep, ASK_BOTH_PROMPT, ASK_DESTINATION_PROMPT,
    ASK_PASSPORT_PROMPT, COMPLETION_PREFIX, INTERNAL_ERROR_MESSAGE,
};
pub use reconcile::{
    reconcile, reconcile_evidence, EvidenceSource, Reconciled, SlotChange, SlotChanges,
};
pub use session_state::SessionState;
