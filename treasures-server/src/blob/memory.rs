//! In-memory blob store

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{BlobStore, BlobUrls, StorageRef, validate_blob_path};
use crate::db::store::StoreResult;

#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<String, (Vec<u8>, String)>>,
    uploads: Arc<AtomicUsize>,
    urls: BlobUrls,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs are prefixed with `public_base_url` instead of being relative
    pub fn with_base_url(public_base_url: impl Into<String>) -> Self {
        Self {
            urls: BlobUrls::new(public_base_url),
            ..Self::default()
        }
    }

    /// Number of upload calls that stored a blob
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.blobs.get(path).map(|b| b.1.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<StorageRef> {
        validate_blob_path(path)?;
        self.blobs
            .insert(path.to_string(), (bytes, content_type.to_string()));
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(StorageRef {
            path: path.to_string(),
        })
    }

    async fn url(&self, reference: &StorageRef) -> StoreResult<String> {
        Ok(self.urls.url_for(&reference.path))
    }

    async fn delete(&self, reference: &StorageRef) -> StoreResult<()> {
        self.blobs.remove(&reference.path);
        Ok(())
    }

    async fn read(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_blob_path(path)?;
        Ok(self.blobs.get(path).map(|b| b.0.clone()))
    }

    fn reference_for_url(&self, url: &str) -> Option<StorageRef> {
        self.urls.path_for(url).map(|path| StorageRef { path })
    }
}
