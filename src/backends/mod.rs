//! Built-in backends
//!
//! - **Passthrough**: stores arbitrary JSON under the request path

pub mod passthrough;

pub use passthrough::PassthroughBackend;
