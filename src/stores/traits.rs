use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Document database holding submitted listings
///
/// Writes are always full documents under a fresh id; nothing is merged.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether a document with this id already exists
    async fn exists(&self, collection: &str, id: &str) -> Result<bool>;

    /// Write a complete document
    async fn store(&self, collection: &str, id: &str, record: &Value) -> Result<()>;

    /// Name of the backend, for logs
    fn backend_name(&self) -> &'static str;
}

/// Object storage for listing images
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at `path` and return a publicly resolvable URL
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<String>;

    /// Remove a previously uploaded object
    async fn delete(&self, path: &str) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}
