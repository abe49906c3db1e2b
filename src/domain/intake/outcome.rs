//! Per-request decision table and outcomes.

use crate::domain::foundation::{CountryCode, CountrySlot};

use super::SessionState;

/// Prompt used when nothing is known yet.
pub const ASK_BOTH_PROMPT: &str = "Could you please share your passport country and destination?";

/// Prompt used when only the destination is known.
pub const ASK_PASSPORT_PROMPT: &str = "Could you please specify your passport issuer?";

/// Prompt used when only the passport is known.
pub const ASK_DESTINATION_PROMPT: &str = "Could you clarify your destination country?";

/// Prefix for a successful visa answer.
pub const COMPLETION_PREFIX: &str = "Thank you for the information. ";

/// Fixed message for faults whose details must not reach the caller.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// What the controller must do after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Nothing known: hand the text to the scope responder.
    Greet,
    /// Destination known, passport missing.
    AskPassport { destination: CountryCode },
    /// Passport known, destination missing.
    AskDestination { passport: CountryCode },
    /// Both known: resolve the visa answer.
    Resolve {
        passport: CountryCode,
        destination: CountryCode,
    },
}

impl NextStep {
    /// Reads the decision table for a reconciled state.
    pub fn for_state(state: &SessionState) -> Self {
        match (state.passport, state.destination) {
            (CountrySlot::Unknown, CountrySlot::Unknown) => NextStep::Greet,
            (CountrySlot::Unknown, CountrySlot::Known(destination)) => {
                NextStep::AskPassport { destination }
            }
            (CountrySlot::Known(passport), CountrySlot::Unknown) => {
                NextStep::AskDestination { passport }
            }
            (CountrySlot::Known(passport), CountrySlot::Known(destination)) => NextStep::Resolve {
                passport,
                destination,
            },
        }
    }

    /// Prompt for an incomplete step.
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            NextStep::Greet => Some(ASK_BOTH_PROMPT),
            NextStep::AskPassport { .. } => Some(ASK_PASSPORT_PROMPT),
            NextStep::AskDestination { .. } => Some(ASK_DESTINATION_PROMPT),
            NextStep::Resolve { .. } => None,
        }
    }
}

/// Why a request ended in an error outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The visa resolver could not answer; slots were kept.
    Resolution,
    /// Anything unexpected; details only went to the log.
    Internal,
}

/// Terminal result of one intake request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// Greeting or out-of-scope reply; no slot is known.
    Greeting { message: String },
    /// One slot is still missing.
    Incomplete {
        message: String,
        passport: Option<CountryCode>,
        destination: Option<CountryCode>,
    },
    /// Visa answer produced; the session has been reset.
    Complete {
        message: String,
        passport: CountryCode,
        destination: CountryCode,
    },
    /// Resolution failed or an internal fault occurred.
    Failed { kind: FailureKind, message: String },
}

impl IntakeOutcome {
    /// Builds the incomplete outcome for a step, if the step is incomplete.
    pub fn incomplete(step: NextStep) -> Option<Self> {
        let (passport, destination) = match step {
            NextStep::AskPassport { destination } => (None, Some(destination)),
            NextStep::AskDestination { passport } => (Some(passport), None),
            NextStep::Greet | NextStep::Resolve { .. } => return None,
        };
        Some(IntakeOutcome::Incomplete {
            message: step.prompt().unwrap_or(ASK_BOTH_PROMPT).to_string(),
            passport,
            destination,
        })
    }

    pub fn complete(visa_message: &str, passport: CountryCode, destination: CountryCode) -> Self {
        IntakeOutcome::Complete {
            message: format!("{}{}", COMPLETION_PREFIX, visa_message),
            passport,
            destination,
        }
    }

    pub fn resolution_failed(reason: impl std::fmt::Display) -> Self {
        IntakeOutcome::Failed {
            kind: FailureKind::Resolution,
            message: format!("Could not check visa requirements: {}", reason),
        }
    }

    pub fn internal_error() -> Self {
        IntakeOutcome::Failed {
            kind: FailureKind::Internal,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            IntakeOutcome::Greeting { .. } => "greeting",
            IntakeOutcome::Incomplete { .. } => "incomplete",
            IntakeOutcome::Complete { .. } => "complete",
            IntakeOutcome::Failed { .. } => "error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            IntakeOutcome::Greeting { message }
            | IntakeOutcome::Incomplete { message, .. }
            | IntakeOutcome::Complete { message, .. }
            | IntakeOutcome::Failed { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> CountryCode {
        CountryCode::new(raw).unwrap()
    }

    #[test]
    fn empty_state_greets() {
        assert_eq!(NextStep::for_state(&SessionState::empty()), NextStep::Greet);
    }

    #[test]
    fn destination_only_asks_for_passport() {
        let state = SessionState::new(CountrySlot::Unknown, code("JPN").into());
        assert_eq!(
            NextStep::for_state(&state),
            NextStep::AskPassport {
                destination: code("JPN")
            }
        );
    }

    #[test]
    fn passport_only_asks_for_destination() {
        let state = SessionState::new(code("FRA").into(), CountrySlot::Unknown);
        let step = NextStep::for_state(&state);
        assert_eq!(step, NextStep::AskDestination { passport: code("FRA") });
        assert_eq!(step.prompt(), Some(ASK_DESTINATION_PROMPT));
    }

    #[test]
    fn both_known_resolves() {
        let state = SessionState::new(code("FRA").into(), code("JPN").into());
        assert_eq!(
            NextStep::for_state(&state),
            NextStep::Resolve {
                passport: code("FRA"),
                destination: code("JPN")
            }
        );
    }

    #[test]
    fn incomplete_outcome_exposes_known_slot() {
        let outcome = IntakeOutcome::incomplete(NextStep::AskDestination {
            passport: code("FRA"),
        })
        .unwrap();
        assert_eq!(
            outcome,
            IntakeOutcome::Incomplete {
                message: ASK_DESTINATION_PROMPT.to_string(),
                passport: Some(code("FRA")),
                destination: None,
            }
        );
    }

    #[test]
    fn incomplete_is_none_for_terminal_steps() {
        assert!(IntakeOutcome::incomplete(NextStep::Greet).is_none());
    }

    #[test]
    fn complete_message_is_prefixed() {
        let outcome = IntakeOutcome::complete("Visa free.", code("FRA"), code("JPN"));
        assert_eq!(outcome.message(), "Thank you for the information. Visa free.");
        assert_eq!(outcome.label(), "complete");
    }

    #[test]
    fn resolution_failure_carries_reason() {
        let outcome = IntakeOutcome::resolution_failed("table unavailable");
        assert_eq!(
            outcome.message(),
            "Could not check visa requirements: table unavailable"
        );
        assert!(matches!(
            outcome,
            IntakeOutcome::Failed {
                kind: FailureKind::Resolution,
                ..
            }
        ));
    }
}
