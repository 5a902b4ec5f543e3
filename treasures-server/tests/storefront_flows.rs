//! End-to-end repository flows on the in-memory stores
//! Run: cargo test -p treasures-server --test storefront_flows

use std::io::Cursor;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use shared::{ChangeAction, ChangeEvent, ErrorCode, ResourceKind};
use treasures_server::blob::MemoryBlobStore;
use treasures_server::db::repository::{ImageRepository, SettingsRepository};
use treasures_server::db::store::MemoryDocumentStore;
use treasures_server::message::ChangeBus;
use treasures_server::utils::imaging::ImageUpload;

struct Storefront {
    settings: SettingsRepository,
    images: ImageRepository,
    store: MemoryDocumentStore,
    blobs: MemoryBlobStore,
    bus: ChangeBus,
}

fn storefront() -> Storefront {
    let store = MemoryDocumentStore::new();
    let blobs = MemoryBlobStore::new();
    let bus = ChangeBus::new();
    Storefront {
        settings: SettingsRepository::new(Arc::new(store.clone()), bus.clone()),
        images: ImageRepository::new(
            Arc::new(store.clone()),
            Arc::new(blobs.clone()),
            bus.clone(),
            true,
        ),
        store,
        blobs,
        bus,
    }
}

fn png_upload(name: &str) -> ImageUpload {
    let img = image::RgbImage::from_fn(80, 60, |x, y| image::Rgb([(x * 3) as u8, (y * 4) as u8, 90]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    ImageUpload {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes,
    }
}

#[tokio::test]
async fn default_fill_is_idempotent() {
    let shop = storefront();

    let first = shop.settings.get().await.unwrap();
    let writes_after_first = shop.store.write_count();
    let second = shop.settings.get().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(writes_after_first, 1);
    assert_eq!(shop.store.write_count(), 1);
}

#[tokio::test]
async fn partial_update_keeps_other_sections() {
    let shop = storefront();
    shop.settings
        .update(&json!({ "texts": { "about": { "title": "Our Story" } } }))
        .await
        .unwrap();

    let updated = shop
        .settings
        .update(&json!({ "texts": { "header": { "text": "X" } } }))
        .await
        .unwrap();

    assert_eq!(updated.texts.header.text, "X");
    assert_eq!(updated.texts.about.title, "Our Story");
    assert_eq!(updated.effects.ken_burns.duration_ms, 20000);
}

#[tokio::test]
async fn last_selected_image_cannot_be_removed() {
    let shop = storefront();
    let only = shop.images.add(png_upload("only.png")).await.unwrap();

    let err = shop.images.toggle(&only.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::LastSelectedImage);

    let selected = shop.images.list_selected().await.unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, only.id);
}

#[tokio::test]
async fn delete_cascades_to_selection_and_blob() {
    let shop = storefront();
    let keep = shop.images.add(png_upload("keep.png")).await.unwrap();
    let gone = shop.images.add(png_upload("gone.png")).await.unwrap();
    assert_eq!(shop.blobs.len(), 2);

    shop.images.delete(&gone.id).await.unwrap();

    let all = shop.images.list().await.unwrap();
    let selected = shop.images.list_selected().await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(selected.iter().all(|r| r.id != gone.id));
    assert_eq!(selected[0].id, keep.id);
    assert!(!shop.blobs.contains(&gone.path));
}

#[tokio::test]
async fn max_images_rejected_before_upload() {
    let shop = storefront();
    for i in 0..shared::models::MAX_IMAGES {
        shop.images
            .add(png_upload(&format!("{i}.png")))
            .await
            .unwrap();
    }
    let uploads = shop.blobs.upload_count();

    let err = shop.images.add(png_upload("eleven.png")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ImageLimitReached);
    assert_eq!(shop.blobs.upload_count(), uploads);
}

#[tokio::test]
async fn reorder_is_mirrored_into_selection() {
    let shop = storefront();
    let a = shop.images.add(png_upload("a.png")).await.unwrap().id;
    let b = shop.images.add(png_upload("b.png")).await.unwrap().id;
    let c = shop.images.add(png_upload("c.png")).await.unwrap().id;

    shop.images
        .reorder(&[a.clone(), c.clone(), b.clone()])
        .await
        .unwrap();

    for (id, expected) in [(&a, 1), (&c, 2), (&b, 3)] {
        let record = shop.images.get(id).await.unwrap().unwrap();
        assert_eq!(record.order, expected);
    }
    let selected = shop.images.list_selected().await.unwrap();
    let orders: Vec<(String, u32)> = selected.into_iter().map(|r| (r.id, r.order)).collect();
    assert_eq!(orders, vec![(a, 1), (c, 2), (b, 3)]);
}

#[tokio::test]
async fn subscribers_see_each_successful_update_once() {
    let shop = storefront();
    let first: Arc<Mutex<Vec<ChangeEvent>>> = Arc::default();
    let second: Arc<Mutex<Vec<ChangeEvent>>> = Arc::default();

    let sink = Arc::clone(&first);
    let _a = shop.bus.subscribe(move |e| sink.lock().push(e.clone()));
    let sink = Arc::clone(&second);
    let _b = shop.bus.subscribe(move |e| sink.lock().push(e.clone()));

    shop.settings
        .update(&json!({ "autoplay": false }))
        .await
        .unwrap();
    assert_eq!(first.lock().len(), 1);
    assert_eq!(second.lock().len(), 1);
    assert_eq!(first.lock()[0].resource, ResourceKind::Settings);
    assert_eq!(first.lock()[0].action, ChangeAction::Updated);

    // rejected patch: nothing published
    let err = shop
        .settings
        .update(&json!({ "autoplaySpeed": "fast" }))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SettingsInvalid);
    assert_eq!(first.lock().len(), 1);
    assert_eq!(second.lock().len(), 1);
}

#[tokio::test]
async fn unsubscribed_handler_stops_receiving() {
    let shop = storefront();
    let seen: Arc<Mutex<Vec<ChangeEvent>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let sub = shop.bus.subscribe(move |e| sink.lock().push(e.clone()));

    shop.settings.update(&json!({ "autoplay": false })).await.unwrap();
    sub.unsubscribe();
    shop.settings.update(&json!({ "autoplay": true })).await.unwrap();

    assert_eq!(seen.lock().len(), 1);
}

#[tokio::test]
async fn interleaved_settings_writers_conflict() {
    let shop = storefront();
    let (_, version) = shop.settings.load().await.unwrap();

    // a second writer lands between read and write
    shop.settings
        .update(&json!({ "autoplaySpeed": 9000 }))
        .await
        .unwrap();

    use treasures_server::db::store::DocumentStore;
    let stale = shop
        .store
        .put_versioned(
            shared::models::SETTINGS_COLLECTION,
            shared::models::SETTINGS_ID,
            json!({ "autoplay": false }),
            version,
        )
        .await;
    assert!(stale.is_err());

    let current = shop.settings.get().await.unwrap();
    assert_eq!(current.autoplay_speed, 9000);
    assert!(current.autoplay);
}

#[tokio::test]
async fn sse_receiver_gets_image_events() {
    let shop = storefront();
    let mut rx = shop.bus.receiver();

    let record = shop.images.add(png_upload("a.png")).await.unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.resource, ResourceKind::Images);
    assert_eq!(event.action, ChangeAction::Created);
    assert_eq!(event.id.as_deref(), Some(record.id.as_str()));
    assert_eq!(event.version, 1);
}
