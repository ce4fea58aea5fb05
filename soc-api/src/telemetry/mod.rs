//! soc Telemetry - Logging Infrastructure
//!
//! Structured logging through `tracing` and a per-request span and
//! completion line for every page served.

pub mod middleware;
pub mod tracer;

pub use middleware::observability_middleware;
pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
