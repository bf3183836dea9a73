/**
 * End-to-end photo pipeline tests against the SQLite store
 * Upload, reload in a new session, replace and remove
 */

use folio::constants::{DEFAULT_PHOTO_PATH, PHOTO_MAX_EDGE, PROFILE_PHOTO_KEY};
use folio::photo::{
    BlobStore, Display, DisplayRegistry, PhotoController, PhotoState, SqliteBlobStore,
};
use image::{DynamicImage, GenericImageView, ImageOutputFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

fn encode(width: u32, height: u32, format: ImageOutputFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

async fn session(path: &Path) -> (PhotoController<SqliteBlobStore>, DisplayRegistry) {
    let registry = DisplayRegistry::new();
    let store = SqliteBlobStore::open(path).await.unwrap();
    (PhotoController::new(store, registry.clone()), registry)
}

#[tokio::test]
async fn photo_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("folio-portfolio.db");

    let (mut first, _) = session(&db).await;
    assert_eq!(first.mount().await, &PhotoState::Default);
    assert!(matches!(first.upload(encode(2400, 1600, ImageOutputFormat::Png)).await, PhotoState::Loaded(_)));
    let uploaded = first.current_blob().unwrap();
    first.store().close().await;
    drop(first);

    let (mut second, registry) = session(&db).await;
    let PhotoState::Loaded(url) = second.mount().await.clone() else {
        panic!("stored photo was not restored");
    };
    assert_eq!(second.display(), Display::Photo(url.clone()));
    assert_eq!(registry.live_count(), 1);

    let restored = registry.resolve(&url).unwrap();
    assert_eq!(restored.bytes, uploaded.bytes);

    let decoded = image::load_from_memory(&restored.bytes).unwrap();
    assert_eq!(decoded.dimensions(), (PHOTO_MAX_EDGE, 512));
}

#[tokio::test]
async fn jpeg_upload_is_bounded_and_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctl, registry) = session(&dir.path().join("photos.db")).await;

    ctl.upload(encode(900, 3000, ImageOutputFormat::Jpeg(90))).await;
    let first = ctl.current_blob().unwrap();
    let decoded = image::load_from_memory(&first.bytes).unwrap();
    assert_eq!(decoded.dimensions(), (230, PHOTO_MAX_EDGE));

    ctl.upload(encode(320, 240, ImageOutputFormat::Png)).await;
    let second = ctl.current_blob().unwrap();
    assert_ne!(first.bytes, second.bytes);
    assert_eq!(registry.live_count(), 1);

    let stored = ctl.store().get(PROFILE_PHOTO_KEY).await.unwrap().unwrap();
    assert_eq!(stored.bytes, second.bytes);
}

#[tokio::test]
async fn removal_survives_a_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("photos.db");

    let (mut ctl, _) = session(&db).await;
    ctl.upload(encode(64, 64, ImageOutputFormat::Png)).await;
    assert_eq!(ctl.remove().await, &PhotoState::Default);
    ctl.store().close().await;
    drop(ctl);

    let (mut ctl, registry) = session(&db).await;
    assert_eq!(ctl.mount().await, &PhotoState::Default);
    assert_eq!(ctl.display(), Display::Default(DEFAULT_PHOTO_PATH));
    assert_eq!(registry.live_count(), 0);
}
