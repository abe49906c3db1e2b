//! Intake HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{AnalyzeMessageRequest, AnalyzeMessageResponse, ResponseStatus};
pub use handlers::{analyze_message, health, IntakeApiError, IntakeAppState};
pub use routes::{intake_router, intake_routes};
