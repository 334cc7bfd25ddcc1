//! Passthrough backend
//!
//! Stores arbitrary JSON objects at the requested path and hands them back on
//! read. An object with a `ttl` (or `lease`) field is returned as a renewable
//! leased secret.

use crate::errors::{LogicalError, Result};
use crate::logical::{Backend, Data, Operation, Request, Response, Secret, StorageEntry};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const BACKEND_TYPE: &str = "passthrough";

const HELP: &str = "The passthrough backend reads and writes arbitrary data \
to the backend storage. Writing `ttl` alongside the data turns reads into \
leased secrets that can be renewed or revoked.";

/// Fields that carry a lease duration, in lookup order
const LEASE_FIELDS: [&str; 2] = ["ttl", "lease"];

#[derive(Debug, Default)]
pub struct PassthroughBackend;

impl PassthroughBackend {
    pub fn new() -> Self {
        Self
    }

    async fn handle_read(&self, req: &Request<'_>) -> Result<Option<Response>> {
        let path = require_path(req)?;
        let Some(entry) = req.storage()?.get(path).await? else {
            return Ok(None);
        };
        let data: Data = entry.decode_json()?;

        match lease_from(&data)? {
            Some(lease) => {
                let mut internal = Data::new();
                internal.insert("path".to_string(), json!(path));
                let secret = Secret::new(lease)
                    .renewable(true)
                    .with_internal_data(internal);
                Ok(Some(Response::secret(secret, data)))
            }
            None => Ok(Some(Response::data(data))),
        }
    }

    async fn handle_write(&self, req: &Request<'_>) -> Result<Option<Response>> {
        let path = require_path(req)?;
        let data = match &req.data {
            Some(data) if !data.is_empty() => data,
            _ => return Err(LogicalError::invalid_request("missing data fields")),
        };
        // reject an unparseable lease now rather than on every read
        lease_from(data)?;

        req.storage()?.put(StorageEntry::json(path, data)?).await?;
        Ok(None)
    }

    async fn handle_delete(&self, req: &Request<'_>) -> Result<Option<Response>> {
        let path = require_path(req)?;
        req.storage()?.delete(path).await?;
        Ok(None)
    }

    async fn handle_list(&self, req: &Request<'_>) -> Result<Option<Response>> {
        let keys = req.storage()?.list(&list_prefix(&req.path)).await?;
        let mut data = Data::new();
        data.insert("keys".to_string(), json!(keys));
        Ok(Some(Response::data(data)))
    }

    fn handle_renew(&self, req: &Request<'_>) -> Result<Option<Response>> {
        let secret = req
            .secret()
            .ok_or_else(|| LogicalError::invalid_request("renew requires a secret"))?;
        if !secret.renewable {
            return Err(LogicalError::invalid_request("secret is not renewable"));
        }

        let lease = match req.get("ttl") {
            Some(value) => parse_ttl(value)?,
            None => secret.lease,
        };

        let mut renewed = secret.clone();
        renewed.lease = lease;
        Ok(Some(Response::secret(renewed, Data::new())))
    }

    fn handle_revoke(&self, req: &Request<'_>) -> Result<Option<Response>> {
        // stored data outlives its leases, so there is nothing to tear down
        req.secret()
            .ok_or_else(|| LogicalError::invalid_request("revoke requires a secret"))?;
        Ok(None)
    }
}

#[async_trait]
impl Backend for PassthroughBackend {
    async fn handle_request(&self, req: &Request<'_>) -> Result<Option<Response>> {
        debug!(operation = %req.operation, path = %req.path, "Passthrough request");

        match req.operation {
            Operation::Read => self.handle_read(req).await,
            Operation::Write => self.handle_write(req).await,
            Operation::Delete => self.handle_delete(req).await,
            Operation::List => self.handle_list(req).await,
            Operation::Help => {
                let mut data = Data::new();
                data.insert("help".to_string(), json!(HELP));
                Ok(Some(Response::data(data)))
            }
            Operation::Renew => self.handle_renew(req),
            Operation::Revoke => self.handle_revoke(req),
            Operation::Rollback => Err(LogicalError::unsupported_operation(req.operation.as_str())),
        }
    }

    fn backend_type(&self) -> &'static str {
        BACKEND_TYPE
    }
}

fn require_path<'r>(req: &'r Request<'_>) -> Result<&'r str> {
    if req.path.is_empty() {
        return Err(LogicalError::unsupported_path(""));
    }
    Ok(req.path.as_str())
}

/// Listing `app` means listing the folder `app/`, never keys that merely
/// start with `app`
fn list_prefix(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

fn lease_from(data: &Data) -> Result<Option<Duration>> {
    LEASE_FIELDS
        .iter()
        .find_map(|field| data.get(*field).filter(|v| !v.is_null()))
        .map(parse_ttl)
        .transpose()
}

/// Parse a TTL given as whole seconds (number or string) or a string with an
/// `s`, `m`, `h` or `d` suffix.
pub fn parse_ttl(value: &Value) -> Result<Duration> {
    let invalid = || LogicalError::invalid_request(format!("invalid ttl: {}", value));

    match value {
        Value::Number(n) => n.as_u64().map(Duration::from_secs).ok_or_else(invalid),
        Value::String(s) => {
            let s = s.trim();
            let (digits, unit) = match s.char_indices().last() {
                Some((idx, c)) if c.is_ascii_alphabetic() => (&s[..idx], c),
                _ => (s, 's'),
            };
            let count: u64 = digits.parse().map_err(|_| invalid())?;
            let multiplier = match unit {
                's' => 1,
                'm' => 60,
                'h' => 60 * 60,
                'd' => 24 * 60 * 60,
                _ => return Err(invalid()),
            };
            count
                .checked_mul(multiplier)
                .map(Duration::from_secs)
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical::{renew_request, revoke_request, rollback_request, InmemStorage};

    fn fields(value: Value) -> Data {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_ttl() {
        assert_eq!(parse_ttl(&json!(90)).unwrap(), Duration::from_secs(90));
        assert_eq!(parse_ttl(&json!("90")).unwrap(), Duration::from_secs(90));
        assert_eq!(parse_ttl(&json!("30s")).unwrap(), Duration::from_secs(30));
        assert_eq!(parse_ttl(&json!("5m")).unwrap(), Duration::from_secs(300));
        assert_eq!(parse_ttl(&json!("1h")).unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_ttl(&json!("2d")).unwrap(), Duration::from_secs(172_800));

        for bad in [json!("1w"), json!("h"), json!(""), json!(-5), json!(1.5), json!(true)] {
            assert!(parse_ttl(&bad).unwrap_err().is_invalid_request(), "{bad} should fail");
        }
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let storage = InmemStorage::new();
        let backend = PassthroughBackend::new();

        let write = Request::new(Operation::Write, "foo")
            .with_data(fields(json!({"value": "bar"})))
            .with_storage(&storage);
        assert!(backend.handle_request(&write).await.unwrap().is_none());

        let read = Request::new(Operation::Read, "foo").with_storage(&storage);
        let resp = backend.handle_request(&read).await.unwrap().unwrap();
        assert!(!resp.is_secret());
        assert_eq!(resp.data["value"], json!("bar"));
    }

    #[tokio::test]
    async fn test_read_with_ttl_issues_secret() {
        let storage = InmemStorage::new();
        let backend = PassthroughBackend::new();

        let write = Request::new(Operation::Write, "creds/app")
            .with_data(fields(json!({"password": "hunter2", "ttl": "1h"})))
            .with_storage(&storage);
        backend.handle_request(&write).await.unwrap();

        let read = Request::new(Operation::Read, "creds/app").with_storage(&storage);
        let resp = backend.handle_request(&read).await.unwrap().unwrap();
        let secret = resp.secret.unwrap();
        assert_eq!(secret.lease, Duration::from_secs(3600));
        assert!(secret.renewable);
        assert_eq!(secret.internal_data["path"], json!("creds/app"));
    }

    #[tokio::test]
    async fn test_read_missing_returns_none() {
        let storage = InmemStorage::new();
        let read = Request::new(Operation::Read, "nope").with_storage(&storage);
        let resp = PassthroughBackend::new().handle_request(&read).await.unwrap();
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn test_write_requires_data() {
        let storage = InmemStorage::new();
        let backend = PassthroughBackend::new();

        let no_data = Request::new(Operation::Write, "foo").with_storage(&storage);
        let err = backend.handle_request(&no_data).await.unwrap_err();
        assert!(err.is_invalid_request());

        let bad_ttl = Request::new(Operation::Write, "foo")
            .with_data(fields(json!({"ttl": "soon"})))
            .with_storage(&storage);
        let err = backend.handle_request(&bad_ttl).await.unwrap_err();
        assert!(err.is_invalid_request());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_root_path_is_unsupported_for_keyed_operations() {
        let storage = InmemStorage::new();
        let backend = PassthroughBackend::new();

        for op in [Operation::Read, Operation::Write, Operation::Delete] {
            let req = Request::new(op, "")
                .with_data(fields(json!({"a": 1})))
                .with_storage(&storage);
            let err = backend.handle_request(&req).await.unwrap_err();
            assert!(err.is_unsupported_path(), "{op} at root should be unsupported");
        }
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let storage = InmemStorage::new();
        let backend = PassthroughBackend::new();

        for path in ["app/a", "app/b", "app/nested/c"] {
            let write = Request::new(Operation::Write, path)
                .with_data(fields(json!({"v": 1})))
                .with_storage(&storage);
            backend.handle_request(&write).await.unwrap();
        }

        let list = Request::new(Operation::List, "app/").with_storage(&storage);
        let resp = backend.handle_request(&list).await.unwrap().unwrap();
        assert_eq!(resp.data["keys"], json!(["a", "b", "nested/"]));

        let delete = Request::new(Operation::Delete, "app/a").with_storage(&storage);
        backend.handle_request(&delete).await.unwrap();

        let resp = backend.handle_request(&list).await.unwrap().unwrap();
        assert_eq!(resp.data["keys"], json!(["b", "nested/"]));
    }

    #[tokio::test]
    async fn test_list_without_trailing_slash_ignores_siblings() {
        let storage = InmemStorage::new();
        let backend = PassthroughBackend::new();

        for path in ["app/a", "app/b", "apple"] {
            let write = Request::new(Operation::Write, path)
                .with_data(fields(json!({"value": path})))
                .with_storage(&storage);
            backend.handle_request(&write).await.unwrap();
        }

        for path in ["app", "app/"] {
            let list = Request::new(Operation::List, path).with_storage(&storage);
            let resp = backend.handle_request(&list).await.unwrap().unwrap();
            assert_eq!(resp.data["keys"], json!(["a", "b"]), "{path}");
        }

        let root = Request::new(Operation::List, "").with_storage(&storage);
        let resp = backend.handle_request(&root).await.unwrap().unwrap();
        assert_eq!(resp.data["keys"], json!(["app/", "apple"]));
    }

    #[test]
    fn test_list_prefix() {
        assert_eq!(list_prefix(""), "");
        assert_eq!(list_prefix("app"), "app/");
        assert_eq!(list_prefix("app/"), "app/");
    }

    #[tokio::test]
    async fn test_help() {
        let req = Request::new(Operation::Help, "");
        let resp = PassthroughBackend::new().handle_request(&req).await.unwrap().unwrap();
        assert!(resp.data["help"].as_str().unwrap().contains("passthrough"));
    }

    #[tokio::test]
    async fn test_renew_uses_requested_ttl() {
        let backend = PassthroughBackend::new();
        let secret = Secret::new(Duration::from_secs(60)).renewable(true);

        let req = renew_request("creds/app", &secret, fields(json!({"ttl": "1h"})));
        let resp = backend.handle_request(&req).await.unwrap().unwrap();
        assert_eq!(resp.secret.unwrap().lease, Duration::from_secs(3600));

        let req = renew_request("creds/app", &secret, None);
        let resp = backend.handle_request(&req).await.unwrap().unwrap();
        assert_eq!(resp.secret.unwrap().lease, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_renew_rejects_bad_secrets() {
        let backend = PassthroughBackend::new();

        let err = backend
            .handle_request(&renew_request("creds/app", None, None))
            .await
            .unwrap_err();
        assert!(err.is_invalid_request());

        let fixed = Secret::new(Duration::from_secs(60));
        let err = backend
            .handle_request(&renew_request("creds/app", &fixed, None))
            .await
            .unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[tokio::test]
    async fn test_revoke_and_rollback() {
        let backend = PassthroughBackend::new();
        let secret = Secret::new(Duration::from_secs(60));

        let resp = backend
            .handle_request(&revoke_request("creds/app", &secret, None))
            .await
            .unwrap();
        assert!(resp.is_none());

        let err = backend
            .handle_request(&revoke_request("creds/app", None, None))
            .await
            .unwrap_err();
        assert!(err.is_invalid_request());

        let err = backend.handle_request(&rollback_request("")).await.unwrap_err();
        assert!(err.is_unsupported_operation());
    }
}
