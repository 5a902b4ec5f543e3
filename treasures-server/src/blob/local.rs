//! Filesystem blob store rooted at `<work_dir>/uploads`

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{BlobStore, BlobUrls, StorageRef, validate_blob_path};
use crate::db::store::StoreResult;

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    urls: BlobUrls,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            urls: BlobUrls::new(public_base_url),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        validate_blob_path(path)?;
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<StorageRef> {
        let file_path = self.resolve(path)?;
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file_path, &bytes).await?;
        tracing::debug!(path = %path, size = bytes.len(), content_type = %content_type, "Blob written");
        Ok(StorageRef {
            path: path.to_string(),
        })
    }

    async fn url(&self, reference: &StorageRef) -> StoreResult<String> {
        Ok(self.urls.url_for(&reference.path))
    }

    async fn delete(&self, reference: &StorageRef) -> StoreResult<()> {
        let file_path = self.resolve(&reference.path)?;
        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %reference.path, "Blob already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let file_path = self.resolve(path)?;
        match tokio::fs::read(&file_path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn reference_for_url(&self, url: &str) -> Option<StorageRef> {
        self.urls.path_for(url).map(|path| StorageRef { path })
    }
}
