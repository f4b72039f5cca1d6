//! Observability setup for Counsel.

pub mod tracing_setup;
