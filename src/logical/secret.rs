//! Previously issued secrets referenced by renew and revoke requests.

use super::Data;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A secret returned by a backend and tracked by the lease subsystem.
///
/// Requests only ever borrow a `Secret`; ownership stays with whoever issued
/// the lease.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    /// Lease identifier assigned by the lease subsystem (empty until assigned)
    #[serde(default)]
    pub lease_id: String,

    /// How long the secret is valid for
    #[serde(default)]
    pub lease: Duration,

    /// Extra time after `lease` before the secret is revoked
    #[serde(default)]
    pub lease_grace_period: Duration,

    /// Whether the backend accepts renew requests for this secret
    #[serde(default)]
    pub renewable: bool,

    /// Backend-private state needed later to renew or revoke the secret.
    /// Never returned to the caller that requested the secret.
    #[serde(default)]
    pub internal_data: Data,
}

impl Secret {
    pub fn new(lease: Duration) -> Self {
        Self {
            lease,
            ..Default::default()
        }
    }

    pub fn with_lease_id(mut self, lease_id: impl Into<String>) -> Self {
        self.lease_id = lease_id.into();
        self
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.lease_grace_period = grace;
        self
    }

    pub fn renewable(mut self, renewable: bool) -> Self {
        self.renewable = renewable;
        self
    }

    pub fn with_internal_data(mut self, data: Data) -> Self {
        self.internal_data = data;
        self
    }

    /// True if the secret carries a lease at all
    pub fn is_leased(&self) -> bool {
        !self.lease.is_zero()
    }

    /// Lease plus grace period
    pub fn max_lifetime(&self) -> Duration {
        self.lease.saturating_add(self.lease_grace_period)
    }
}
