use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::stores::traits::{BlobStore, RecordStore};

/// Record store writing one pretty-printed JSON file per document
pub struct LocalRecordStore {
    root: PathBuf,
}

impl LocalRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf> {
        let relative = safe_relative(&format!("{collection}/{id}.json"))?;
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl RecordStore for LocalRecordStore {
    async fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        let path = self.document_path(collection, id)?;
        tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to check {}", path.display()))
    }

    async fn store(&self, collection: &str, id: &str, record: &Value) -> Result<()> {
        let path = self.document_path(collection, id)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("💾 Saved {}/{} to {}", collection, id, path.display());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "local-json"
    }
}

/// Blob store backed by a directory, optionally served under a public base URL
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    fn url_for(&self, path: &str, file: &Path) -> String {
        match &self.public_base_url {
            Some(base) => format!("{base}/{path}"),
            None => format!("file://{}", file.display()),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let file = self.root.join(safe_relative(path)?);
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&file, bytes)
            .await
            .with_context(|| format!("Failed to write {}", file.display()))?;

        debug!(path, content_type, bytes = bytes.len(), "stored blob");
        Ok(self.url_for(path, &file))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let file = self.root.join(safe_relative(path)?);
        tokio::fs::remove_file(&file)
            .await
            .with_context(|| format!("Failed to delete {}", file.display()))
    }

    fn backend_name(&self) -> &'static str {
        "local-files"
    }
}

/// Reject absolute paths and `..` so every write stays under the root
fn safe_relative(path: &str) -> Result<PathBuf> {
    let candidate = Path::new(path);
    let mut clean = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => anyhow::bail!("Refusing to write outside the storage root: {path}"),
        }
    }
    if clean.as_os_str().is_empty() {
        anyhow::bail!("Empty storage path");
    }
    Ok(clean)
}
