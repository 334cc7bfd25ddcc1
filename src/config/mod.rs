//! # Configuration Management
//!
//! Settings for the router's rollback sweep and for logging, loaded from
//! `LOGICAL_*` environment variables and validated with `validator`.

pub mod settings;

pub use settings::{AppConfig, ObservabilityConfig, RouterConfig};
