//! Product Repository

use std::sync::Arc;

use shared::models::{PRODUCTS_COLLECTION, ProductImageUpload, ProductInput, ProductRecord};
use shared::{AppError, AppResult, ChangeAction, ErrorCode, ResourceKind};

use crate::blob::{BlobStore, StorageRef};
use crate::db::store::{Document, DocumentStore, StoreResult};
use crate::message::ChangeBus;
use crate::utils::imaging::{ImageUpload, process_upload, validate_upload};

const BLOB_DIR: &str = "products";

#[derive(Debug, Clone)]
pub struct ProductRepository {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    bus: ChangeBus,
    compress: bool,
}

impl ProductRepository {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        bus: ChangeBus,
        compress: bool,
    ) -> Self {
        Self {
            store,
            blobs,
            bus,
            compress,
        }
    }

    /// Products by creation time; `active_only` hides deactivated ones
    pub async fn list(&self, active_only: bool) -> AppResult<Vec<ProductRecord>> {
        let docs = self
            .store
            .list(PRODUCTS_COLLECTION, Some("createdAt"))
            .await?;
        let products: Vec<ProductRecord> = docs
            .iter()
            .map(Document::decode)
            .collect::<StoreResult<_>>()?;
        Ok(products
            .into_iter()
            .filter(|p| !active_only || p.is_active)
            .collect())
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<ProductRecord>> {
        let doc = self.store.get(PRODUCTS_COLLECTION, id).await?;
        Ok(doc.map(|d| d.decode()).transpose()?)
    }

    /// Create (`input.id == None`) or update a product
    pub async fn save(&self, input: ProductInput) -> AppResult<ProductRecord> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::ProductNameRequired,
                "Product name is required",
            ));
        }
        let images: Vec<String> = input
            .images
            .iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if images.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::ProductImageRequired,
                "At least one product image is required",
            ));
        }

        let now = shared::util::now_millis();
        let (record, previous, action) = match input.id.as_deref() {
            Some(id) => {
                let existing = self.require(id).await?;
                let record = ProductRecord {
                    id: existing.id.clone(),
                    name: name.to_string(),
                    description: input.description.trim().to_string(),
                    images,
                    is_active: input.is_active,
                    amazon_link: input.amazon_link.trim().to_string(),
                    created_at: existing.created_at,
                    updated_at: now,
                };
                (record, Some(existing), ChangeAction::Updated)
            }
            None => {
                let record = ProductRecord {
                    id: shared::util::new_id(),
                    name: name.to_string(),
                    description: input.description.trim().to_string(),
                    images,
                    is_active: input.is_active,
                    amazon_link: input.amazon_link.trim().to_string(),
                    created_at: now,
                    updated_at: now,
                };
                (record, None, ChangeAction::Created)
            }
        };

        let body = serde_json::to_value(&record)
            .map_err(|e| AppError::internal(format!("Failed to encode product: {e}")))?;
        self.store.put(PRODUCTS_COLLECTION, &record.id, body).await?;

        if let Some(previous) = previous {
            let dropped: Vec<&String> = previous
                .images
                .iter()
                .filter(|url| !record.images.contains(*url))
                .collect();
            for url in dropped {
                self.release_image(url).await;
            }
        }

        tracing::info!(id = %record.id, name = %record.name, action = %action, "Product saved");
        self.bus
            .notify(ResourceKind::Products, action, Some(record.id.clone()));
        Ok(record)
    }

    /// Delete the product's stored images, then the product itself
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let product = self.require(id).await?;

        for url in &product.images {
            if let Some(reference) = self.owned_reference(url) {
                self.blobs.delete(&reference).await.inspect_err(|e| {
                    tracing::error!(id = %id, url = %url, error = %e, "Failed to delete product image")
                })?;
            }
        }
        self.store.delete(PRODUCTS_COLLECTION, id).await?;

        tracing::info!(id = %id, images = product.images.len(), "Product deleted");
        self.bus.notify(
            ResourceKind::Products,
            ChangeAction::Deleted,
            Some(id.to_string()),
        );
        Ok(())
    }

    /// Store one product image and return its URL. Nothing references it
    /// until a product is saved with that URL.
    pub async fn upload_image(&self, upload: ImageUpload) -> AppResult<ProductImageUpload> {
        validate_upload(&upload)?;
        let compress = self.compress;
        let processed = tokio::task::spawn_blocking(move || process_upload(upload, compress))
            .await
            .map_err(|e| AppError::internal(format!("Image processing task failed: {e}")))??;

        let path = format!(
            "{}/{}.{}",
            BLOB_DIR,
            uuid::Uuid::new_v4().simple(),
            processed.extension
        );
        let size = processed.bytes.len() as u64;
        let reference = self
            .blobs
            .upload(&path, processed.bytes, &processed.content_type)
            .await?;
        let url = self.blobs.url(&reference).await?;

        tracing::info!(path = %reference.path, size, "Product image uploaded");
        Ok(ProductImageUpload {
            url,
            path: reference.path,
            size,
        })
    }

    async fn require(&self, id: &str) -> AppResult<ProductRecord> {
        self.get(id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", id))
                .with_detail("id", id.to_string())
        })
    }

    /// Blob behind `url` if it was uploaded as a product image. Slider
    /// images and external URLs are never released from here.
    fn owned_reference(&self, url: &str) -> Option<StorageRef> {
        self.blobs
            .reference_for_url(url)
            .filter(|reference| reference.path.starts_with(&format!("{BLOB_DIR}/")))
    }

    /// Best effort: the product is already saved without this image
    async fn release_image(&self, url: &str) {
        let Some(reference) = self.owned_reference(url) else {
            return;
        };
        if let Err(e) = self.blobs.delete(&reference).await {
            tracing::warn!(path = %reference.path, error = %e, "Failed to delete dropped product image");
        }
    }
}
