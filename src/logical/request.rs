//! The request envelope handed to backends.

use super::{Data, Operation, Secret, Storage};
use crate::errors::{LogicalError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One unit of dispatched work.
///
/// A request borrows its storage and secret, so it cannot outlive the dispatch
/// call it was built for. Backends that need to keep anything must copy it.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    /// The requested operation
    pub operation: Operation,

    /// The part of the request path not consumed by routing. If a backend is
    /// mounted at `prod/aws/` and the caller asked for `prod/aws/foo`, this
    /// is `foo`.
    pub path: String,

    /// Caller supplied fields. No key is reserved by the protocol.
    pub data: Option<Data>,

    /// Durable state scoped to the backend's mount
    pub storage: Option<&'a dyn Storage>,

    /// Set only for `Renew` and `Revoke`: the secret returned earlier
    pub secret: Option<&'a Secret>,
}

impl Default for Request<'_> {
    fn default() -> Self {
        Self {
            operation: Operation::Read,
            path: String::new(),
            data: None,
            storage: None,
            secret: None,
        }
    }
}

/// Outcome of a typed field lookup that keeps "missing" and "wrong type" apart
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'v, T> {
    Present(T),
    Absent,
    Mismatch(&'v Value),
}

impl<T> Field<'_, T> {
    /// Collapse to `Option`, treating a type mismatch like a missing field
    pub fn ok(self) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Absent | Field::Mismatch(_) => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Field::Mismatch(_))
    }
}

impl<'a> Request<'a> {
    /// Request for `operation` on `path`, with no data, storage or secret
    pub fn new(operation: Operation, path: impl Into<String>) -> Self {
        Self {
            operation,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: impl Into<Option<Data>>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_storage(mut self, storage: &'a dyn Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Raw field lookup. Returns `None` when there is no data, the key is
    /// missing, or the stored value is null.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data
            .as_ref()
            .and_then(|data| data.get(key))
            .filter(|value| !value.is_null())
    }

    /// Field as text; `""` when missing or not a string. Validation belongs
    /// to the backend, this never fails.
    pub fn get_string(&self, key: &str) -> &str {
        self.lookup_string(key).ok().unwrap_or("")
    }

    /// Field as text, reporting whether it was missing or had another type
    pub fn lookup_string(&self, key: &str) -> Field<'_, &str> {
        match self.get(key) {
            None => Field::Absent,
            Some(Value::String(s)) => Field::Present(s.as_str()),
            Some(other) => Field::Mismatch(other),
        }
    }

    /// Deserialize a field into `T`; a present field that does not fit is an
    /// invalid request
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => T::deserialize(value).map(Some).map_err(|e| {
                LogicalError::invalid_request(format!("field '{}' has the wrong type: {}", key, e))
            }),
        }
    }

    /// Storage attached by the router
    pub fn storage(&self) -> Result<&'a dyn Storage> {
        self.storage
            .ok_or_else(|| LogicalError::invalid_request("no storage attached to request"))
    }

    pub fn secret(&self) -> Option<&'a Secret> {
        self.secret
    }

    /// True if data is unset or empty
    pub fn has_no_data(&self) -> bool {
        self.data.as_ref().map_or(true, |data| data.is_empty())
    }
}

/// Build a renew request for a previously issued secret.
///
/// No validation happens here; a missing secret surfaces as an error from the
/// backend that receives the request. Storage is attached at dispatch.
pub fn renew_request<'a>(
    path: impl Into<String>,
    secret: impl Into<Option<&'a Secret>>,
    data: impl Into<Option<Data>>,
) -> Request<'a> {
    Request {
        operation: Operation::Renew,
        path: path.into(),
        data: data.into(),
        storage: None,
        secret: secret.into(),
    }
}

/// Build a revoke request for a previously issued secret
pub fn revoke_request<'a>(
    path: impl Into<String>,
    secret: impl Into<Option<&'a Secret>>,
    data: impl Into<Option<Data>>,
) -> Request<'a> {
    Request {
        operation: Operation::Revoke,
        path: path.into(),
        data: data.into(),
        storage: None,
        secret: secret.into(),
    }
}

/// Build a rollback request asking a backend to finish or discard any partial
/// work it left under `path`
pub fn rollback_request<'a>(path: impl Into<String>) -> Request<'a> {
    Request {
        operation: Operation::Rollback,
        path: path.into(),
        data: None,
        storage: None,
        secret: None,
    }
}
