//! # warenhaus-observability
//!
//! Observability-Crate fuer Warenhaus:
//! - Health-Check-Endpunkt (`/health`)
//! - Structured Logging via tracing-subscriber (text oder JSON)
//! - Request-Timing Middleware

pub mod health;
pub mod logging;
pub mod middleware;

pub use health::{health_router, HealthState, HealthStatus};
pub use logging::logging_initialisieren;
pub use middleware::{request_timing_layer, timing_middleware};
