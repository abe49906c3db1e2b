//! Visa Sherpa - Conversational visa requirement intake
//!
//! Collects a traveler's passport country and destination from chat text
//! and passport images, one request at a time, then answers with the visa
//! requirement for that pair.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
