//! Slider Image Repository
//!
//! Two collections: every uploaded image (`slider_images`) and the subset
//! shown in the slider (`selected_images`). Selected entries mirror the
//! full record, including its `order`.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use shared::models::{
    ALL_IMAGES_COLLECTION, ImageRecord, MAX_IMAGES, MoveDirection, SELECTED_IMAGES_COLLECTION,
    SelectionState,
};
use shared::{AppError, AppResult, ChangeAction, ErrorCode, ResourceKind};

use crate::blob::{BlobStore, StorageRef};
use crate::db::store::{Document, DocumentStore, StoreResult};
use crate::message::ChangeBus;
use crate::utils::imaging::{ImageUpload, process_upload, validate_upload};

const BLOB_DIR: &str = "slider";

#[derive(Debug, Clone)]
pub struct ImageRepository {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    bus: ChangeBus,
    compress: bool,
}

impl ImageRepository {
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

    /// Every image, by display order
    pub async fn list(&self) -> AppResult<Vec<ImageRecord>> {
        self.list_collection(ALL_IMAGES_COLLECTION).await
    }

    /// Images shown in the slider, by display order
    pub async fn list_selected(&self) -> AppResult<Vec<ImageRecord>> {
        self.list_collection(SELECTED_IMAGES_COLLECTION).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<ImageRecord>> {
        let doc = self.store.get(ALL_IMAGES_COLLECTION, id).await?;
        Ok(doc.map(|d| d.decode()).transpose()?)
    }

    async fn list_collection(&self, collection: &str) -> AppResult<Vec<ImageRecord>> {
        let docs = self.store.list(collection, Some("order")).await?;
        Ok(decode_all(&docs)?)
    }

    /// Validate, compress and store a new image. It is appended to the end
    /// of the order and selected right away.
    pub async fn add(&self, upload: ImageUpload) -> AppResult<ImageRecord> {
        validate_upload(&upload)?;

        let existing = self.list().await?;
        if existing.len() >= MAX_IMAGES {
            return Err(AppError::with_message(
                ErrorCode::ImageLimitReached,
                format!("Maximum of {} images allowed", MAX_IMAGES),
            )
            .with_detail("max_images", MAX_IMAGES as u64));
        }

        let file_name = upload.file_name.clone();
        let compress = self.compress;
        let processed = tokio::task::spawn_blocking(move || process_upload(upload, compress))
            .await
            .map_err(|e| AppError::internal(format!("Image processing task failed: {e}")))??;

        let id = shared::util::new_id();
        let path = format!("{}/{}.{}", BLOB_DIR, id, processed.extension);
        let size = processed.bytes.len() as u64;
        let reference = self
            .blobs
            .upload(&path, processed.bytes, &processed.content_type)
            .await?;
        let url = self.blobs.url(&reference).await?;

        let record = ImageRecord {
            id: id.clone(),
            path,
            url,
            order: existing.len() as u32 + 1,
            created_at: shared::util::now_millis(),
            file_name,
            size,
            original_size: processed.original_size,
            dimensions: processed.dimensions,
        };
        let body = to_body(&record)?;
        self.store.put(ALL_IMAGES_COLLECTION, &id, body.clone()).await?;
        self.store.put(SELECTED_IMAGES_COLLECTION, &id, body).await?;

        tracing::info!(
            id = %id,
            order = record.order,
            size = record.size,
            original_size = record.original_size,
            "Slider image added"
        );
        self.bus
            .notify(ResourceKind::Images, ChangeAction::Created, Some(id));
        Ok(record)
    }

    /// Remove the blob and both records, then close the gap in the order.
    ///
    /// Steps are not rolled back: a failure part-way leaves the earlier
    /// deletions in place.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let record = self.require(id).await?;

        self.blobs
            .delete(&StorageRef {
                path: record.path.clone(),
            })
            .await
            .inspect_err(|e| tracing::error!(id = %id, error = %e, "Failed to delete image blob"))?;
        self.store.delete(ALL_IMAGES_COLLECTION, id).await?;
        self.store.delete(SELECTED_IMAGES_COLLECTION, id).await?;

        let remaining = renumber(self.list().await?);
        self.write_orders(&remaining).await?;

        if let Some(first) = remaining.first()
            && self.list_selected().await?.is_empty()
        {
            tracing::info!(id = %first.id, "Selection emptied by delete, selecting first image");
            self.store
                .put(SELECTED_IMAGES_COLLECTION, &first.id, to_body(first)?)
                .await?;
        }

        tracing::info!(id = %id, remaining = remaining.len(), "Slider image deleted");
        self.bus.notify(
            ResourceKind::Images,
            ChangeAction::Deleted,
            Some(id.to_string()),
        );
        Ok(())
    }

    /// Apply a new order. `ids` must contain every image exactly once.
    pub async fn reorder(&self, ids: &[String]) -> AppResult<Vec<ImageRecord>> {
        let current = self.list().await?;

        let unique: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let known: HashSet<&str> = current.iter().map(|r| r.id.as_str()).collect();
        if unique.len() != ids.len() || unique != known {
            return Err(AppError::validation(
                "Reorder must list every image id exactly once",
            )
            .with_detail("expected", current.len() as u64)
            .with_detail("received", ids.len() as u64));
        }

        let reordered: Vec<ImageRecord> = ids
            .iter()
            .enumerate()
            .filter_map(|(idx, id)| {
                current.iter().find(|r| &r.id == id).map(|r| ImageRecord {
                    order: idx as u32 + 1,
                    ..r.clone()
                })
            })
            .collect();
        self.write_orders(&reordered).await?;

        tracing::info!(count = reordered.len(), "Slider images reordered");
        self.bus
            .notify(ResourceKind::Images, ChangeAction::Reordered, None);
        Ok(reordered)
    }

    /// Swap an image with its neighbour. Moving past either end is a no-op.
    pub async fn move_image(&self, id: &str, direction: MoveDirection) -> AppResult<Vec<ImageRecord>> {
        let current = self.list().await?;
        let pos = current
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| image_not_found(id))?;

        let target = match direction {
            MoveDirection::Up => pos.checked_sub(1),
            MoveDirection::Down => Some(pos + 1).filter(|t| *t < current.len()),
        };
        let Some(target) = target else {
            return Ok(current);
        };

        let mut ids: Vec<String> = current.into_iter().map(|r| r.id).collect();
        ids.swap(pos, target);
        self.reorder(&ids).await
    }

    /// Add an image to the slider or take it out.
    ///
    /// The slider always keeps at least one image: removing the last
    /// selected one is rejected.
    pub async fn toggle(&self, id: &str) -> AppResult<SelectionState> {
        let record = self.require(id).await?;
        let selected = self.list_selected().await?;
        let is_selected = selected.iter().any(|r| r.id == id);

        let state = if is_selected {
            if selected.len() == 1 {
                return Err(AppError::with_message(
                    ErrorCode::LastSelectedImage,
                    "At least one image must remain selected",
                ));
            }
            self.store.delete(SELECTED_IMAGES_COLLECTION, id).await?;
            SelectionState {
                id: id.to_string(),
                selected: false,
                selected_count: selected.len() - 1,
            }
        } else {
            self.store
                .put(SELECTED_IMAGES_COLLECTION, id, to_body(&record)?)
                .await?;
            SelectionState {
                id: id.to_string(),
                selected: true,
                selected_count: selected.len() + 1,
            }
        };

        tracing::info!(id = %id, selected = state.selected, "Slider selection changed");
        self.bus.notify(
            ResourceKind::Images,
            ChangeAction::SelectionChanged,
            Some(id.to_string()),
        );
        Ok(state)
    }

    async fn require(&self, id: &str) -> AppResult<ImageRecord> {
        self.get(id).await?.ok_or_else(|| image_not_found(id))
    }

    /// Persist records to the all-images collection and mirror them into
    /// the selected entries that exist.
    async fn write_orders(&self, records: &[ImageRecord]) -> AppResult<()> {
        let docs = records
            .iter()
            .map(|r| Ok((r.id.clone(), to_body(r)?)))
            .collect::<AppResult<Vec<_>>>()?;
        self.store.batch_put(ALL_IMAGES_COLLECTION, docs).await?;

        let selected: HashSet<String> = self
            .list_selected()
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let mirrored = records
            .iter()
            .filter(|r| selected.contains(&r.id))
            .map(|r| Ok((r.id.clone(), to_body(r)?)))
            .collect::<AppResult<Vec<_>>>()?;
        self.store
            .batch_put(SELECTED_IMAGES_COLLECTION, mirrored)
            .await?;
        Ok(())
    }
}

/// Assign `order = index + 1` in the current sequence
fn renumber(records: Vec<ImageRecord>) -> Vec<ImageRecord> {
    records
        .into_iter()
        .enumerate()
        .map(|(idx, r)| ImageRecord {
            order: idx as u32 + 1,
            ..r
        })
        .collect()
}

fn decode_all(docs: &[Document]) -> StoreResult<Vec<ImageRecord>> {
    docs.iter().map(Document::decode).collect()
}

fn to_body(record: &ImageRecord) -> AppResult<Value> {
    serde_json::to_value(record)
        .map_err(|e| AppError::internal(format!("Failed to encode image record: {e}")))
}

fn image_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::ImageNotFound, format!("Image {} not found", id))
        .with_detail("id", id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use crate::db::store::MemoryDocumentStore;
    use crate::utils::imaging::test_images;

    struct Fixture {
        repo: ImageRepository,
        store: MemoryDocumentStore,
        blobs: MemoryBlobStore,
        bus: ChangeBus,
    }

    fn fixture() -> Fixture {
        let store = MemoryDocumentStore::new();
        let blobs = MemoryBlobStore::new();
        let bus = ChangeBus::new();
        let repo = ImageRepository::new(
            Arc::new(store.clone()),
            Arc::new(blobs.clone()),
            bus.clone(),
            true,
        );
        Fixture {
            repo,
            store,
            blobs,
            bus,
        }
    }

    fn upload(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: test_images::png(64, 48),
        }
    }

    async fn add_three(repo: &ImageRepository) -> (String, String, String) {
        let a = repo.add(upload("a.png")).await.unwrap().id;
        let b = repo.add(upload("b.png")).await.unwrap().id;
        let c = repo.add(upload("c.png")).await.unwrap().id;
        (a, b, c)
    }

    fn ids(records: &[ImageRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_add_appends_and_selects() {
        let fx = fixture();
        let first = fx.repo.add(upload("a.png")).await.unwrap();
        let second = fx.repo.add(upload("b.png")).await.unwrap();

        assert_eq!(first.order, 1);
        assert_eq!(second.order, 2);
        assert_eq!(first.dimensions.width, 64);
        assert!(first.path.starts_with("slider/"));
        assert!(first.path.ends_with(".jpg"));
        assert!(first.url.ends_with(&first.path));
        assert!(fx.blobs.contains(&first.path));
        assert_eq!(fx.blobs.content_type(&first.path).as_deref(), Some("image/jpeg"));

        let selected = fx.repo.list_selected().await.unwrap();
        assert_eq!(ids(&selected), vec![first.id.as_str(), second.id.as_str()]);
        assert_eq!(fx.bus.version(ResourceKind::Images), 2);
    }

    #[tokio::test]
    async fn test_add_rejects_non_image() {
        let fx = fixture();
        let err = fx
            .repo
            .add(ImageUpload {
                file_name: "notes.txt".into(),
                content_type: "text/plain".into(),
                bytes: b"hello".to_vec(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageUnsupportedType);
        assert!(fx.blobs.is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_undecodable_bytes() {
        let fx = fixture();
        let err = fx
            .repo
            .add(ImageUpload {
                file_name: "broken.png".into(),
                content_type: "image/png".into(),
                bytes: vec![1, 2, 3, 4],
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageDecodeFailed);
        assert_eq!(fx.blobs.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_max_images_rejected_without_upload() {
        let fx = fixture();
        for i in 0..MAX_IMAGES {
            fx.repo.add(upload(&format!("{i}.png"))).await.unwrap();
        }
        let uploads = fx.blobs.upload_count();
        let writes = fx.store.write_count();

        let err = fx.repo.add(upload("extra.png")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageLimitReached);
        assert_eq!(fx.blobs.upload_count(), uploads);
        assert_eq!(fx.store.write_count(), writes);
        assert_eq!(fx.repo.list().await.unwrap().len(), MAX_IMAGES);
    }

    #[tokio::test]
    async fn test_delete_cascades_and_renumbers() {
        let fx = fixture();
        let (a, b, c) = add_three(&fx.repo).await;
        let b_path = fx.repo.get(&b).await.unwrap().unwrap().path;

        fx.repo.delete(&b).await.unwrap();

        let all = fx.repo.list().await.unwrap();
        assert_eq!(ids(&all), vec![a.as_str(), c.as_str()]);
        assert_eq!(all[1].order, 2);
        let selected = fx.repo.list_selected().await.unwrap();
        assert_eq!(ids(&selected), vec![a.as_str(), c.as_str()]);
        assert_eq!(selected[1].order, 2);
        assert!(!fx.blobs.contains(&b_path));
    }

    #[tokio::test]
    async fn test_delete_unknown_image() {
        let fx = fixture();
        let err = fx.repo.delete("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageNotFound);
    }

    #[tokio::test]
    async fn test_delete_last_selected_selects_first_remaining() {
        let fx = fixture();
        let (a, b, c) = add_three(&fx.repo).await;
        fx.repo.toggle(&a).await.unwrap();
        fx.repo.toggle(&b).await.unwrap();

        fx.repo.delete(&c).await.unwrap();

        let selected = fx.repo.list_selected().await.unwrap();
        assert_eq!(ids(&selected), vec![a.as_str()]);
    }

    #[tokio::test]
    async fn test_reorder_mirrors_into_selected() {
        let fx = fixture();
        let (a, b, c) = add_three(&fx.repo).await;

        fx.repo
            .reorder(&[a.clone(), c.clone(), b.clone()])
            .await
            .unwrap();

        let all = fx.repo.list().await.unwrap();
        assert_eq!(ids(&all), vec![a.as_str(), c.as_str(), b.as_str()]);
        let orders: Vec<u32> = all.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);

        let selected = fx.repo.list_selected().await.unwrap();
        assert_eq!(ids(&selected), vec![a.as_str(), c.as_str(), b.as_str()]);
        let c_selected = selected.iter().find(|r| r.id == c).unwrap();
        assert_eq!(c_selected.order, 2);
    }

    #[tokio::test]
    async fn test_reorder_requires_permutation() {
        let fx = fixture();
        let (a, b, _c) = add_three(&fx.repo).await;
        let version = fx.bus.version(ResourceKind::Images);

        let missing = fx.repo.reorder(&[a.clone(), b.clone()]).await.unwrap_err();
        assert_eq!(missing.code, ErrorCode::ValidationFailed);

        let duplicate = fx
            .repo
            .reorder(&[a.clone(), a.clone(), b.clone()])
            .await
            .unwrap_err();
        assert_eq!(duplicate.code, ErrorCode::ValidationFailed);
        assert_eq!(fx.bus.version(ResourceKind::Images), version);
    }

    #[tokio::test]
    async fn test_move_image() {
        let fx = fixture();
        let (a, b, c) = add_three(&fx.repo).await;

        let moved = fx.repo.move_image(&c, MoveDirection::Up).await.unwrap();
        assert_eq!(ids(&moved), vec![a.as_str(), c.as_str(), b.as_str()]);

        let version = fx.bus.version(ResourceKind::Images);
        let unchanged = fx.repo.move_image(&a, MoveDirection::Up).await.unwrap();
        assert_eq!(ids(&unchanged), vec![a.as_str(), c.as_str(), b.as_str()]);
        assert_eq!(fx.bus.version(ResourceKind::Images), version);

        let err = fx
            .repo
            .move_image("missing", MoveDirection::Down)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageNotFound);
    }

    #[tokio::test]
    async fn test_toggle_keeps_one_selected() {
        let fx = fixture();
        let (a, b, _c) = add_three(&fx.repo).await;

        let state = fx.repo.toggle(&a).await.unwrap();
        assert!(!state.selected);
        assert_eq!(state.selected_count, 2);
        fx.repo.toggle(&b).await.unwrap();

        let last = fx.repo.list_selected().await.unwrap();
        assert_eq!(last.len(), 1);
        let err = fx.repo.toggle(&last[0].id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LastSelectedImage);
        assert_eq!(fx.repo.list_selected().await.unwrap().len(), 1);

        let back = fx.repo.toggle(&a).await.unwrap();
        assert!(back.selected);
        assert_eq!(back.selected_count, 2);
    }

    #[tokio::test]
    async fn test_toggle_unknown_image() {
        let fx = fixture();
        let err = fx.repo.toggle("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageNotFound);
    }

    #[tokio::test]
    async fn test_uncompressed_upload_keeps_bytes() {
        let store = MemoryDocumentStore::new();
        let blobs = MemoryBlobStore::new();
        let repo = ImageRepository::new(
            Arc::new(store),
            Arc::new(blobs.clone()),
            ChangeBus::new(),
            false,
        );
        let bytes = test_images::png(32, 32);
        let record = repo
            .add(ImageUpload {
                file_name: "raw.png".into(),
                content_type: "image/png".into(),
                bytes: bytes.clone(),
            })
            .await
            .unwrap();
        assert!(record.path.ends_with(".png"));
        assert_eq!(record.size, bytes.len() as u64);
        assert_eq!(record.original_size, bytes.len() as u64);
    }
}
