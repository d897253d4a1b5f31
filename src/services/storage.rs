use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Persistence for uploaded admission documents, keyed per application.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores one document under the application's namespace and returns the
    /// store key it was written to.
    async fn store(&self, application_id: &str, filename: &str, data: &[u8]) -> Result<String>;
}

/// Disk-backed store writing under a media root, one directory per
/// application: `{root}/applications/{application_id}/{filename}`.
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn store(&self, application_id: &str, filename: &str, data: &[u8]) -> Result<String> {
        let key = format!("applications/{}/{}", application_id, filename);
        let path = self.root.join(&key);

        let parent = path
            .parent()
            .context("document path has no parent directory")?;
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;

        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(key)
    }
}
