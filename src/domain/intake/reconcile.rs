//! Slot reconciliation.
//!
//! Merges the evidence of one request into the session state:
//!
//! - a known image passport always replaces the passport slot
//! - a known text passport only fills an empty passport slot, and only when
//!   the image did not produce one
//! - a known text destination always replaces the destination slot
//!
//! The reducer is pure. Callers persist the returned state.

use crate::domain::foundation::CountrySlot;

use super::{ExtractionResult, RequestEvidence, SessionState};

/// Where a slot value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceSource {
    Image,
    Text,
}

impl EvidenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceSource::Image => "image",
            EvidenceSource::Text => "text",
        }
    }
}

/// A single slot write that changed the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotChange {
    pub from: CountrySlot,
    pub to: CountrySlot,
    pub source: EvidenceSource,
}

/// Slot writes performed by one reconciliation, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotChanges {
    pub passport: Option<SlotChange>,
    pub destination: Option<SlotChange>,
}

impl SlotChanges {
    pub fn is_empty(&self) -> bool {
        self.passport.is_none() && self.destination.is_none()
    }
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub state: SessionState,
    pub changes: SlotChanges,
}

/// Applies one request's extraction results to `state`.
pub fn reconcile(
    state: SessionState,
    image: Option<ExtractionResult>,
    text: Option<ExtractionResult>,
) -> Reconciled {
    let mut next = state;
    let mut changes = SlotChanges::default();

    let image_passport = image
        .map(|result| result.passport_country)
        .filter(CountrySlot::is_known);

    if let Some(passport) = image_passport {
        next.passport = passport;
        changes.passport = change(state.passport, passport, EvidenceSource::Image);
    } else if let Some(text) = text {
        // Checked against the stored value, not `next`.
        if state.passport.is_unknown() && text.passport_country.is_known() {
            next.passport = text.passport_country;
            changes.passport = change(state.passport, next.passport, EvidenceSource::Text);
        }
    }

    if let Some(text) = text {
        if text.destination_country.is_known() {
            next.destination = text.destination_country;
            changes.destination =
                change(state.destination, next.destination, EvidenceSource::Text);
        }
    }

    Reconciled {
        state: next,
        changes,
    }
}

/// Convenience wrapper over buffered [`RequestEvidence`].
pub fn reconcile_evidence(state: SessionState, evidence: RequestEvidence) -> Reconciled {
    reconcile(state, evidence.image, evidence.text)
}

fn change(from: CountrySlot, to: CountrySlot, source: EvidenceSource) -> Option<SlotChange> {
    (from != to).then_some(SlotChange { from, to, source })
}
