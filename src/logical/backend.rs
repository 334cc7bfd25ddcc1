//! Backend trait
//!
//! Defines the interface every pluggable backend implements.

use super::{Request, Response};
use crate::errors::Result;
use async_trait::async_trait;

/// A pluggable handler for a class of secrets under a mount path.
///
/// Implementations switch on [`Request::operation`] and consult the path,
/// data, storage and secret as the operation requires. Work a backend does
/// not support is reported with `UnsupportedOperation` or `UnsupportedPath`;
/// malformed input with `InvalidRequest`.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Handle one request. `Ok(None)` means success with nothing to return.
    async fn handle_request(&self, req: &Request<'_>) -> Result<Option<Response>>;

    /// Short identifier used in logs and mount listings
    fn backend_type(&self) -> &'static str;
}
