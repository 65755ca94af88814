//! Observability setup for Stackplan: structured logging via `tracing` with
//! optional OpenTelemetry span export.

pub mod tracing_setup;

pub use tracing_setup::{LogFormat, TracingOptions, init_tracing, shutdown_tracing};
