//! Request protocol between the router and backends
//!
//! A [`Request`] carries one [`Operation`], the backend-relative path, an
//! optional field mapping, the mount's [`Storage`] and, for renew and revoke,
//! the [`Secret`] being acted on. [`renew_request`], [`revoke_request`] and
//! [`rollback_request`] build requests for lifecycle events that no external
//! caller triggered.

pub mod backend;
pub mod operation;
pub mod request;
pub mod response;
pub mod secret;
pub mod storage;

use std::collections::HashMap;

/// Free-form request and response fields
pub type Data = HashMap<String, serde_json::Value>;

pub use backend::Backend;
pub use operation::Operation;
pub use request::{renew_request, revoke_request, rollback_request, Field, Request};
pub use response::Response;
pub use secret::Secret;
pub use storage::{delete_prefix, InmemStorage, Storage, StorageEntry, StorageView};
