//! Blob Store
//!
//! Opaque byte storage for uploaded images. Blobs are addressed by a
//! relative path (`slider/<id>.jpg`, `products/<uuid>.jpg`) and served
//! back under `/api/blob/<path>`.

mod local;
mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::db::store::{StoreError, StoreResult};

/// Route prefix under which blobs are served
pub const BLOB_ROUTE_PREFIX: &str = "/api/blob/";

/// Reference to an uploaded blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRef {
    pub path: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<StorageRef>;

    async fn url(&self, reference: &StorageRef) -> StoreResult<String>;

    /// Deleting a blob that no longer exists succeeds
    async fn delete(&self, reference: &StorageRef) -> StoreResult<()>;

    async fn read(&self, path: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Map a public URL produced by this store back to its reference
    fn reference_for_url(&self, url: &str) -> Option<StorageRef>;
}

/// Builds and parses public blob URLs
#[derive(Debug, Clone, Default)]
pub struct BlobUrls {
    /// e.g. `https://shop.example.com`; empty for relative URLs
    base: String,
}

impl BlobUrls {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}{}", self.base, BLOB_ROUTE_PREFIX, path)
    }

    pub fn path_for(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(&self.base)?;
        let path = rest.strip_prefix(BLOB_ROUTE_PREFIX)?;
        validate_blob_path(path).ok()?;
        Some(path.to_string())
    }
}

/// Reject anything that could escape the blob root
pub fn validate_blob_path(path: &str) -> StoreResult<()> {
    let valid = !path.is_empty()
        && !path.starts_with('/')
        && path.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        });
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidPath(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_blob_path() {
        assert!(validate_blob_path("slider/123.jpg").is_ok());
        assert!(validate_blob_path("products/ab-cd_1.jpg").is_ok());

        assert!(validate_blob_path("").is_err());
        assert!(validate_blob_path("/etc/passwd").is_err());
        assert!(validate_blob_path("slider/../secret").is_err());
        assert!(validate_blob_path("slider//x.jpg").is_err());
        assert!(validate_blob_path("slider\\x.jpg").is_err());
        assert!(validate_blob_path("slider/x y.jpg").is_err());
    }

    #[test]
    fn test_url_roundtrip_with_base() {
        let urls = BlobUrls::new("https://shop.example.com/");
        let url = urls.url_for("slider/1.jpg");
        assert_eq!(url, "https://shop.example.com/api/blob/slider/1.jpg");
        assert_eq!(urls.path_for(&url).as_deref(), Some("slider/1.jpg"));
    }

    #[test]
    fn test_foreign_urls_are_not_ours() {
        let urls = BlobUrls::new("");
        assert_eq!(urls.path_for("/api/blob/products/a.jpg").as_deref(), Some("products/a.jpg"));
        assert!(urls.path_for("https://cdn.example.com/a.jpg").is_none());
        assert!(urls.path_for("/api/blob/../x").is_none());
    }
}
