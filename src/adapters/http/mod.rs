//! HTTP adapters - REST API implementations.

pub mod intake;
pub mod middleware;
pub mod service;

pub use intake::{intake_router, IntakeAppState};
pub use middleware::SessionCookieSigner;
pub use service::{with_service_layers, ServiceLayers};
