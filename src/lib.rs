//! # Logical Backend
//!
//! The request protocol between a secrets router and the backends mounted
//! under it. Callers hand the router an operation, a path and optional
//! fields; the router picks the backend owning the path, gives it a scoped
//! storage view and returns the backend's response.
//!
//! ## Architecture
//!
//! ```text
//! caller ──► Router ──► Backend (per mount)
//!              │            │
//!              │            └── StorageView ("logical/<mount-id>/...")
//!              └── RollbackManager (periodic rollback requests)
//! ```
//!
//! Renew, revoke and rollback requests are synthesized by the router itself
//! through [`renew_request`], [`revoke_request`] and [`rollback_request`].
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use logical_backend::{backends::PassthroughBackend, AppConfig, Operation, Result, Service};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let service = Service::new(AppConfig::from_env()?)?;
//!     service.router().mount("secret/", Arc::new(PassthroughBackend::new())).await?;
//!     service.router().handle(Operation::Read, "secret/foo", None).await?;
//!     Ok(())
//! }
//! ```

pub mod backends;
pub mod config;
pub mod errors;
pub mod logical;
pub mod observability;
pub mod router;

// Re-export commonly used types and traits
pub use config::{AppConfig, ObservabilityConfig, RouterConfig};
pub use errors::{LogicalError, Result};
pub use logical::{
    renew_request, revoke_request, rollback_request, Backend, Data, Field, InmemStorage,
    Operation, Request, Response, Secret, Storage, StorageEntry, StorageView,
};
pub use observability::init_logging;
pub use router::{MountInfo, RollbackManager, RollbackReport, Router};

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Wires configuration, logging, the router and the rollback sweep together
pub struct Service {
    config: AppConfig,
    router: Arc<Router>,
}

impl Service {
    /// Build a service over in-memory storage
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::with_storage(config, Arc::new(InmemStorage::new()))
    }

    /// Build a service over the given storage. Validates `config` and
    /// installs the tracing subscriber.
    pub fn with_storage(config: AppConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        config.validate()?;
        init_logging(&config.observability)?;

        tracing::info!(app_name = APP_NAME, version = VERSION, "Creating logical service");
        Ok(Self {
            config,
            router: Arc::new(Router::new(storage)),
        })
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Start background tasks. Returns `None` when the rollback sweep is
    /// disabled.
    pub fn start(&self, shutdown: watch::Receiver<bool>) -> Result<Option<JoinHandle<()>>> {
        if !self.config.router.rollback_enabled {
            tracing::info!("Rollback sweep disabled");
            return Ok(None);
        }

        let manager = RollbackManager::from_config(Arc::clone(&self.router), &self.config.router)?;
        Ok(Some(manager.spawn(shutdown)))
    }
}
