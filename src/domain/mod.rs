//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (country codes, session keys, errors)
//! - `intake` - Slot state, reconciliation and the per-request decision table

pub mod foundation;
pub mod intake;
