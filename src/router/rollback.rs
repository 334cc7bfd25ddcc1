//! Periodic rollback sweep
//!
//! Asks every mounted backend to finish or discard work it left partially
//! done. Backends with nothing to roll back answer `UnsupportedOperation`,
//! which the sweep counts as skipped rather than failed.

use super::Router;
use crate::config::RouterConfig;
use crate::errors::{LogicalError, Result};
use crate::logical::rollback_request;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Outcome of one sweep over all mounts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// Mounts a rollback request was sent to
    pub attempted: usize,
    /// Mounts whose backend does not implement rollback
    pub skipped: usize,
    /// Mount path and error message for every failed rollback
    pub failed: Vec<(String, String)>,
}

impl RollbackReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.skipped - self.failed.len()
    }
}

pub struct RollbackManager {
    router: Arc<Router>,
    interval: Duration,
}

impl RollbackManager {
    /// The interval must be non-zero
    pub fn new(router: Arc<Router>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(LogicalError::config("Rollback interval must be greater than zero"));
        }
        Ok(Self { router, interval })
    }

    pub fn from_config(router: Arc<Router>, config: &RouterConfig) -> Result<Self> {
        Self::new(router, config.rollback_interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Send a rollback request to every mount once
    pub async fn sweep(&self) -> RollbackReport {
        let mut report = RollbackReport::default();

        for mount in self.router.mounts().await {
            report.attempted += 1;

            match self.router.route(rollback_request(mount.path.as_str())).await {
                Ok(_) => {}
                Err(e) if e.is_unsupported_operation() => {
                    debug!(mount = %mount.path, "Backend has nothing to roll back");
                    report.skipped += 1;
                }
                Err(e) => {
                    // one failing backend must not stop the sweep for the others
                    warn!(mount = %mount.path, error = %e, "Rollback failed");
                    report.failed.push((mount.path, e.to_string()));
                }
            }
        }

        report
    }

    /// Run the sweep on a fixed interval until `shutdown` flips to `true` or
    /// its sender is dropped
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "Starting rollback sweep");

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Shutdown signal received, stopping rollback sweep");
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        let report = self.sweep().await;
                        debug!(
                            attempted = report.attempted,
                            skipped = report.skipped,
                            failed = report.failed.len(),
                            "Rollback sweep finished"
                        );
                    }
                }
            }
        })
    }
}
