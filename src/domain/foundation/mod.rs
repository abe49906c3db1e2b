//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the intake domain.

mod country_code;
mod errors;
mod ids;
mod timestamp;

pub use country_code::{CountryCode, CountrySlot, UNKNOWN_SENTINEL};
pub use errors::ValidationError;
pub use ids::SessionKey;
pub use timestamp::Timestamp;
