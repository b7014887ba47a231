use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::stores::traits::{BlobStore, RecordStore};

/// In-process record store; used for dry runs and to inject write failures
#[derive(Default)]
pub struct MemoryRecordStore {
    docs: Mutex<HashMap<(String, String), Value>>,
    fail_writes: bool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose writes always fail
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Pre-populate a document, e.g. to force an id collision
    pub fn insert(&self, collection: &str, id: &str, record: Value) {
        self.lock()
            .insert((collection.to_string(), id.to_string()), record);
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.lock()
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), Value>> {
        self.docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self.get(collection, id).is_some())
    }

    async fn store(&self, collection: &str, id: &str, record: &Value) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("record store unavailable"));
        }
        self.insert(collection, id, record.clone());
        debug!(collection, id, "stored record in memory");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// In-process blob store that can be told to fail after a number of uploads
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    uploads: AtomicUsize,
    fail_after: Option<usize>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(BTreeMap::new()),
            uploads: AtomicUsize::new(0),
            fail_after: None,
        }
    }

    /// Accept `successes` uploads, then fail every later one
    pub fn failing_after(successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::new()
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lock().contains_key(path)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8], _content_type: &str) -> Result<String> {
        let attempt = self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| attempt >= limit) {
            return Err(anyhow!("upload of {path} rejected"));
        }
        self.lock().insert(path.to_string(), bytes.to_vec());
        Ok(format!("memory://{path}"))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| anyhow!("no blob at {path}"))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn failing_blob_store_counts_attempts() {
        let store = MemoryBlobStore::failing_after(1);
        assert!(store.upload("a", b"1", "image/png").await.is_ok());
        assert!(store.upload("b", b"2", "image/png").await.is_err());
        assert_eq!(store.paths(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn record_store_round_trips_documents() {
        let store = MemoryRecordStore::new();
        store.store("properties", "F1", &json!({"id": "F1"})).await.unwrap();
        assert!(store.exists("properties", "F1").await.unwrap());
        assert!(!store.exists("leads", "F1").await.unwrap());
        assert_eq!(store.get("properties", "F1"), Some(json!({"id": "F1"})));
    }

    #[tokio::test]
    async fn failing_record_store_keeps_nothing() {
        let store = MemoryRecordStore::failing();
        assert!(store.store("properties", "F1", &json!({})).await.is_err());
        assert!(store.is_empty());
    }
}
