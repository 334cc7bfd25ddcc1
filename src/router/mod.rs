//! Mount table and request dispatch
//!
//! The router owns the mapping from mount prefixes to backends. For every
//! request it finds the owning mount, trims the mount prefix from the path,
//! attaches the mount's storage view and hands the request to the backend.

pub mod rollback;

pub use rollback::{RollbackManager, RollbackReport};

use crate::dispatch_span;
use crate::errors::{LogicalError, Result};
use crate::logical::{
    delete_prefix, Backend, Data, Operation, Request, Response, Storage, StorageView,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, field, info, warn, Instrument, Span};
use uuid::Uuid;

/// Storage namespace under which every mount gets its own view
const MOUNT_STORAGE_PREFIX: &str = "logical/";

#[derive(Clone)]
struct MountEntry {
    backend: Arc<dyn Backend>,
    view: StorageView,
    mount_id: Uuid,
}

/// Public description of a mount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    pub path: String,
    pub backend_type: &'static str,
    pub mount_id: Uuid,
}

/// Routes requests to the backend mounted at the longest matching prefix
pub struct Router {
    storage: Arc<dyn Storage>,
    mounts: RwLock<BTreeMap<String, MountEntry>>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Create a router whose mounts store their state in `storage`
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            mounts: RwLock::new(BTreeMap::new()),
        }
    }

    /// Mount `backend` at `path`.
    ///
    /// The path must be non-empty, relative and end in `/`. Mounts may not be
    /// nested inside one another, so at most one mount owns any path. Each
    /// mount gets a fresh storage namespace.
    pub async fn mount(&self, path: &str, backend: Arc<dyn Backend>) -> Result<Uuid> {
        validate_mount_path(path)?;

        let mut mounts = self.mounts.write().await;
        if let Some(existing) = mounts
            .keys()
            .find(|existing| existing.starts_with(path) || path.starts_with(existing.as_str()))
        {
            warn!(path = %path, existing = %existing, "Rejecting conflicting mount");
            return Err(LogicalError::mount_conflict(path));
        }

        let mount_id = Uuid::new_v4();
        let view = StorageView::new(
            Arc::clone(&self.storage),
            format!("{}{}/", MOUNT_STORAGE_PREFIX, mount_id),
        );

        info!(
            path = %path,
            backend_type = %backend.backend_type(),
            mount_id = %mount_id,
            "Mounting backend"
        );
        mounts.insert(
            path.to_string(),
            MountEntry {
                backend,
                view,
                mount_id,
            },
        );
        Ok(mount_id)
    }

    /// Remove the mount at `path` and delete everything it stored
    pub async fn unmount(&self, path: &str) -> Result<()> {
        let entry = self
            .mounts
            .write()
            .await
            .remove(path)
            .ok_or_else(|| LogicalError::unsupported_path(path))?;

        let deleted = delete_prefix(&entry.view, "").await?;
        info!(
            path = %path,
            mount_id = %entry.mount_id,
            deleted_keys = deleted,
            "Unmounted backend"
        );
        Ok(())
    }

    /// All mounts, ordered by path
    pub async fn mounts(&self) -> Vec<MountInfo> {
        self.mounts
            .read()
            .await
            .iter()
            .map(|(path, entry)| MountInfo {
                path: path.clone(),
                backend_type: entry.backend.backend_type(),
                mount_id: entry.mount_id,
            })
            .collect()
    }

    /// The mount prefix that owns `path`, if any
    pub async fn matching_mount(&self, path: &str) -> Option<String> {
        self.resolve(path).await.map(|(mount, _)| mount)
    }

    async fn resolve(&self, path: &str) -> Option<(String, MountEntry)> {
        let mounts = self.mounts.read().await;
        mounts
            .iter()
            // mounts never nest, so this finds at most one
            .find(|(mount, _)| path_in_mount(path, mount))
            .map(|(mount, entry)| (mount.clone(), entry.clone()))
    }

    /// Dispatch an externally triggered call. The request never carries a
    /// secret; lifecycle requests go through [`Router::route`].
    pub async fn handle(
        &self,
        operation: Operation,
        path: &str,
        data: impl Into<Option<Data>>,
    ) -> Result<Option<Response>> {
        self.route(Request::new(operation, path).with_data(data)).await
    }

    /// Dispatch a request whose path still includes the mount prefix.
    ///
    /// Any storage already attached to `req` is replaced by the mount's view.
    pub async fn route(&self, req: Request<'_>) -> Result<Option<Response>> {
        let span = dispatch_span!(req.operation, req.path);

        async move {
            let Some((mount, entry)) = self.resolve(&req.path).await else {
                debug!("No mount matches path");
                return Err(LogicalError::unsupported_path(req.path));
            };
            Span::current().record("mount", field::display(&mount));

            let trimmed = req.path.get(mount.len()..).unwrap_or_default().to_string();
            let backend_req = Request {
                operation: req.operation,
                path: trimmed,
                data: req.data,
                storage: Some(&entry.view),
                secret: req.secret,
            };

            match entry.backend.handle_request(&backend_req).await {
                Ok(resp) => {
                    debug!(has_response = resp.is_some(), "Request handled");
                    Ok(resp)
                }
                Err(e) => {
                    if e.status_code() >= 500 {
                        warn!(error = %e, "Backend failed to handle request");
                    } else {
                        debug!(error = %e, "Backend rejected request");
                    }
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn validate_mount_path(path: &str) -> Result<()> {
    if path.is_empty() || path == "/" {
        return Err(LogicalError::config("Mount path cannot be empty"));
    }
    if path.starts_with('/') {
        return Err(LogicalError::config(format!("Mount path must be relative: {}", path)));
    }
    if !path.ends_with('/') {
        return Err(LogicalError::config(format!("Mount path must end with '/': {}", path)));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(LogicalError::config(format!(
            "Mount path cannot contain '..': {}",
            path
        )));
    }
    Ok(())
}

/// `secret/foo` and `secret` both belong to the `secret/` mount
fn path_in_mount(path: &str, mount: &str) -> bool {
    path.starts_with(mount) || mount.strip_suffix('/') == Some(path)
}
