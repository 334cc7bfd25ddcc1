//! Durable state capability handed to backends.
//!
//! Backends only see [`Storage`] through a [`Request`](super::Request). The
//! router gives every mount a [`StorageView`] so that keys written by one
//! backend can never collide with another mount's keys.

use crate::errors::{LogicalError, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A single key/value pair in storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub key: String,
    pub value: Vec<u8>,
}

impl StorageEntry {
    pub fn new(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Encode `value` as JSON under `key`
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> Result<Self> {
        let key = key.into();
        let bytes = serde_json::to_vec(value).map_err(|e| {
            LogicalError::serialization(e, format!("Failed to encode storage entry '{}'", key))
        })?;
        Ok(Self { key, value: bytes })
    }

    /// Decode the stored bytes as JSON
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.value).map_err(|e| {
            LogicalError::serialization(e, format!("Failed to decode storage entry '{}'", self.key))
        })
    }
}

/// Key/value storage scoped to a backend's mount.
///
/// Implementations own their concurrency discipline.
#[async_trait]
pub trait Storage: Send + Sync + fmt::Debug {
    /// List the keys directly under `prefix`. Nested keys are collapsed into a
    /// single folder entry ending in `/`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Fetch an entry, `None` if the key does not exist
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>>;

    /// Insert or overwrite an entry
    async fn put(&self, entry: StorageEntry) -> Result<()>;

    /// Delete an entry. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Collapse `keys` (already stripped of the list prefix) into direct children.
fn direct_children<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut children = BTreeSet::new();
    for key in keys.filter(|key| !key.is_empty()) {
        match key.find('/') {
            Some(idx) => children.insert(key[..=idx].to_string()),
            None => children.insert(key.to_string()),
        };
    }
    children.into_iter().collect()
}

/// Delete every key under `prefix`, walking folders returned by `list`.
/// Returns the number of keys deleted.
pub async fn delete_prefix(storage: &dyn Storage, prefix: &str) -> Result<usize> {
    let mut pending = vec![prefix.to_string()];
    let mut deleted = 0;

    while let Some(folder) = pending.pop() {
        for child in storage.list(&folder).await? {
            let key = format!("{}{}", folder, child);
            if child.ends_with('/') {
                pending.push(key);
            } else {
                storage.delete(&key).await?;
                deleted += 1;
            }
        }
    }

    Ok(deleted)
}

/// In-memory storage, mostly for tests and single-process setups
#[derive(Debug, Default, Clone)]
pub struct InmemStorage {
    inner: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl InmemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for InmemStorage {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let map = self.inner.read().await;
        let keys = map
            .range(prefix.to_string()..)
            .map(|(key, _)| key.as_str())
            .take_while(|key| key.starts_with(prefix))
            .map(|key| &key[prefix.len()..]);
        Ok(direct_children(keys))
    }

    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        let map = self.inner.read().await;
        Ok(map.get(key).map(|value| StorageEntry::new(key, value.clone())))
    }

    async fn put(&self, entry: StorageEntry) -> Result<()> {
        let mut map = self.inner.write().await;
        map.insert(entry.key, entry.value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut map = self.inner.write().await;
        map.remove(key);
        Ok(())
    }
}

/// Storage restricted to keys under a fixed prefix.
///
/// Keys passed in are relative to the prefix; keys handed back by `list` and
/// `get` are relative too.
#[derive(Clone)]
pub struct StorageView {
    storage: Arc<dyn Storage>,
    prefix: String,
}

impl fmt::Debug for StorageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageView")
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl StorageView {
    pub fn new(storage: Arc<dyn Storage>, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Nested view under `prefix`, relative to this view
    pub fn sub_view(&self, prefix: &str) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            prefix: format!("{}{}", self.prefix, prefix),
        }
    }

    fn expand_key(&self, key: &str) -> Result<String> {
        if key.split('/').any(|segment| segment == "..") {
            return Err(LogicalError::invalid_request(format!(
                "relative paths not supported: {}",
                key
            )));
        }
        Ok(format!("{}{}", self.prefix, key))
    }

    fn truncate_key<'k>(&self, key: &'k str) -> &'k str {
        key.strip_prefix(self.prefix.as_str()).unwrap_or(key)
    }
}

#[async_trait]
impl Storage for StorageView {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let full = self.expand_key(prefix)?;
        self.storage.list(&full).await
    }

    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        let full = self.expand_key(key)?;
        let entry = self.storage.get(&full).await?;
        Ok(entry.map(|entry| StorageEntry::new(self.truncate_key(&entry.key), entry.value)))
    }

    async fn put(&self, entry: StorageEntry) -> Result<()> {
        let full = self.expand_key(&entry.key)?;
        debug!(prefix = %self.prefix, key = %entry.key, "Writing storage entry");
        self.storage.put(StorageEntry::new(full, entry.value)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let full = self.expand_key(key)?;
        debug!(prefix = %self.prefix, key = %key, "Deleting storage entry");
        self.storage.delete(&full).await
    }
}
