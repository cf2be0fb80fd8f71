//! Observability setup for dfsmate.

pub mod tracing_setup;
