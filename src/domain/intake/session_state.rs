//! Two-slot session state.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CountrySlot;

/// Accumulated intake slots for one session.
///
/// Starts as UNKNOWN/UNKNOWN, is only changed through
/// [`reconcile`](super::reconcile), and is reset as a whole after a
/// successful completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub passport: CountrySlot,
    pub destination: CountrySlot,
}

impl SessionState {
    /// Creates an empty state.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a state from two slots.
    pub fn new(passport: CountrySlot, destination: CountrySlot) -> Self {
        Self {
            passport,
            destination,
        }
    }

    /// Returns true if neither slot is filled.
    pub fn is_empty(&self) -> bool {
        self.passport.is_unknown() && self.destination.is_unknown()
    }

    /// Returns true if both slots are filled.
    pub fn is_complete(&self) -> bool {
        self.passport.is_known() && self.destination.is_known()
    }

    /// Resets both slots.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}
