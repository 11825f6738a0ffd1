//! Observability setup for Mentor Hub: the tracing subscriber and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
