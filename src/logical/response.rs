//! Backend responses.

use super::{Data, Secret};
use serde::{Deserialize, Serialize};

/// What a backend hands back after handling a request.
///
/// A backend returns `Ok(None)` when there is nothing to report (for example a
/// read of a missing key or a successful delete).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Set when the response issues or refreshes a leased secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<Secret>,

    /// Fields returned to the caller
    #[serde(default)]
    pub data: Data,
}

impl Response {
    /// Plain data response
    pub fn data(data: Data) -> Self {
        Self { secret: None, data }
    }

    /// Response that issues a secret alongside its data
    pub fn secret(secret: Secret, data: Data) -> Self {
        Self {
            secret: Some(secret),
            data,
        }
    }

    pub fn is_secret(&self) -> bool {
        self.secret.is_some()
    }
}
