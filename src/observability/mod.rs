//! # Observability Infrastructure
//!
//! Structured logging for request dispatch.

pub mod logging;

pub use logging::init_logging;
