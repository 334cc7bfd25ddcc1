//! Common test utilities for all integration tests.
//!
//! Provides a backend that records every request it receives.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use async_trait::async_trait;
use logical_backend::{Backend, Data, LogicalError, Operation, Request, Response, Result, Secret};
use std::sync::{Arc, Mutex};

/// What a backend saw for one request
#[derive(Debug, Clone)]
pub struct Recorded {
    pub operation: Operation,
    pub path: String,
    pub data: Option<Data>,
    pub secret: Option<Secret>,
    pub had_storage: bool,
}

/// Backend that remembers every request and answers according to its mode
#[derive(Debug, Default)]
pub struct RecordingBackend {
    requests: Mutex<Vec<Recorded>>,
    fail_rollback: bool,
    supports_rollback: bool,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Backend that accepts rollback requests
    pub fn with_rollback() -> Arc<Self> {
        Arc::new(Self {
            supports_rollback: true,
            ..Default::default()
        })
    }

    /// Backend whose rollback always fails with a storage error
    pub fn failing_rollback() -> Arc<Self> {
        Arc::new(Self {
            supports_rollback: true,
            fail_rollback: true,
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("backend received no requests")
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn handle_request(&self, req: &Request<'_>) -> Result<Option<Response>> {
        self.requests.lock().unwrap().push(Recorded {
            operation: req.operation,
            path: req.path.clone(),
            data: req.data.clone(),
            secret: req.secret.cloned(),
            had_storage: req.storage.is_some(),
        });

        match req.operation {
            Operation::Rollback if !self.supports_rollback => {
                Err(LogicalError::unsupported_operation("rollback"))
            }
            Operation::Rollback if self.fail_rollback => {
                Err(LogicalError::storage("rollback state unreadable"))
            }
            _ => Ok(None),
        }
    }

    fn backend_type(&self) -> &'static str {
        "recording"
    }
}

/// Build a `Data` map from a JSON object literal
pub fn data(value: serde_json::Value) -> Data {
    serde_json::from_value(value).expect("test data must be a JSON object")
}
