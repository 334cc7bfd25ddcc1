//! # Error Handling
//!
//! Errors returned by backends, routers and storage. The three protocol
//! sentinels (`UnsupportedOperation`, `UnsupportedPath`, `InvalidRequest`) are
//! ordinary, recoverable values; nothing in this crate treats them as fatal.

pub mod types;

pub use types::{LogicalError, Result};
