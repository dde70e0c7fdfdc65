//! Durable storage for uploaded documents.
//!
//! The engine only needs "store these bytes under this name and tell me where
//! they can be retrieved". [`LocalDocumentStore`] writes into a directory
//! served elsewhere under a public base URL.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::ResultEngine;

/// A store for binary documents.
#[async_trait]
pub trait DocumentStore: fmt::Debug + Send + Sync {
    /// Persist `bytes` under `name`, returning the retrievable URL.
    ///
    /// Implementations must never overwrite an existing document.
    async fn store(&self, name: &str, bytes: &[u8]) -> ResultEngine<String>;
}

/// Stores documents as files in a local directory.
#[derive(Clone, Debug)]
pub struct LocalDocumentStore {
    dir: PathBuf,
    public_url: String,
}

impl LocalDocumentStore {
    pub fn new(dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_url: public_url.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.public_url.trim_end_matches('/'), name)
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn store(&self, name: &str, bytes: &[u8]) -> ResultEngine<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "document stored");
        Ok(self.url_for(name))
    }
}
