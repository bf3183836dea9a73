use crate::constants::{DEFAULT_PHOTO_PATH, PROFILE_PHOTO_KEY};
use crate::photo::{normalize, BlobStore, DisplayHandle, DisplayRegistry, PhotoBlob, PhotoError};
use std::sync::Arc;

const LOAD_FAILED: &str = "Could not load your saved photo.";
const NOT_AN_IMAGE: &str = "That file could not be read as an image. Please choose a JPG, PNG, GIF or WebP file.";
const PROCESS_FAILED: &str = "Could not process that image. Please try another one.";
const SAVE_FAILED: &str = "Could not save your photo. Please try again.";
const REMOVE_FAILED: &str = "Could not remove your photo. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoState {
    Default,
    Loading,
    Loaded(String),
    Error(String),
}

/// What the page should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    /// Bundled image path
    Default(&'static str),
    /// Live display reference URL
    Photo(String),
}

/// Drives the profile photo through load, replace and remove.
///
/// Owns at most one [`DisplayHandle`]; the old handle is released before a
/// new one is minted, and the last one is released when the controller is
/// dropped.
pub struct PhotoController<S> {
    store: S,
    registry: DisplayRegistry,
    state: PhotoState,
    current: Option<DisplayHandle>,
}

impl<S: BlobStore> PhotoController<S> {
    pub fn new(store: S, registry: DisplayRegistry) -> Self {
        Self {
            store,
            registry,
            state: PhotoState::Default,
            current: None,
        }
    }

    pub fn state(&self) -> &PhotoState {
        &self.state
    }

    pub fn display(&self) -> Display {
        match &self.current {
            Some(handle) => Display::Photo(handle.url().to_string()),
            None => Display::Default(DEFAULT_PHOTO_PATH),
        }
    }

    /// Bytes behind the current display reference, if any
    pub fn current_blob(&self) -> Option<Arc<PhotoBlob>> {
        self.current.as_ref().and_then(DisplayHandle::blob)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads a previously stored photo, if there is one.
    pub async fn mount(&mut self) -> &PhotoState {
        self.state = PhotoState::Loading;

        match self.store.get(PROFILE_PHOTO_KEY).await {
            Ok(Some(blob)) => self.show(blob),
            Ok(None) => {
                self.current = None;
                self.state = PhotoState::Default;
            }
            Err(e) => {
                tracing::warn!("Failed to read stored photo: {}", e);
                self.current = None;
                self.state = PhotoState::Error(LOAD_FAILED.to_string());
            }
        }

        &self.state
    }

    /// Normalizes and stores a new photo. On failure the previous photo
    /// stays on display.
    pub async fn upload(&mut self, file: Vec<u8>) -> &PhotoState {
        self.state = PhotoState::Loading;

        let result = async {
            let blob = normalize(file).await?;
            self.store.put(PROFILE_PHOTO_KEY, &blob).await?;
            Ok::<_, PhotoError>(blob)
        }
        .await;

        match result {
            Ok(blob) => self.show(blob),
            Err(e) => {
                tracing::warn!("Photo upload failed: {}", e);
                self.state = PhotoState::Error(upload_message(&e).to_string());
            }
        }

        &self.state
    }

    /// Erases the stored photo and falls back to the default image.
    pub async fn remove(&mut self) -> &PhotoState {
        match self.store.delete(PROFILE_PHOTO_KEY).await {
            Ok(()) => {
                self.current = None;
                self.state = PhotoState::Default;
            }
            Err(e) => {
                tracing::warn!("Failed to remove stored photo: {}", e);
                self.state = PhotoState::Error(REMOVE_FAILED.to_string());
            }
        }

        &self.state
    }

    fn show(&mut self, blob: PhotoBlob) {
        // release before minting so only one reference is ever live
        self.current = None;
        let handle = self.registry.mint(blob);
        self.state = PhotoState::Loaded(handle.url().to_string());
        self.current = Some(handle);
    }
}

fn upload_message(error: &PhotoError) -> &'static str {
    match error {
        PhotoError::Decode(_) => NOT_AN_IMAGE,
        PhotoError::Encode(_) => PROCESS_FAILED,
        PhotoError::Store(_) => SAVE_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::{MemoryBlobStore, StoreError};
    use async_trait::async_trait;
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([10, 120, 240])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    /// Memory store whose operations can be switched to fail
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryBlobStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn fail(&self, on: bool) {
            self.failing.store(on, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                Err(StoreError::Unavailable("disk full".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl BlobStore for FlakyStore {
        async fn put(&self, key: &str, blob: &PhotoBlob) -> Result<(), StoreError> {
            self.check()?;
            self.inner.put(key, blob).await
        }

        async fn get(&self, key: &str) -> Result<Option<PhotoBlob>, StoreError> {
            self.check()?;
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.check()?;
            self.inner.delete(key).await
        }
    }

    fn controller() -> (PhotoController<FlakyStore>, DisplayRegistry) {
        let registry = DisplayRegistry::new();
        (
            PhotoController::new(FlakyStore::default(), registry.clone()),
            registry,
        )
    }

    #[tokio::test]
    async fn empty_store_mounts_to_default() {
        let (mut ctl, registry) = controller();
        assert_eq!(ctl.mount().await, &PhotoState::Default);
        assert_eq!(ctl.display(), Display::Default(DEFAULT_PHOTO_PATH));
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn upload_stores_and_displays() {
        let (mut ctl, registry) = controller();
        ctl.upload(png(1200, 800)).await;

        let PhotoState::Loaded(url) = ctl.state().clone() else {
            panic!("expected Loaded, got {:?}", ctl.state());
        };
        assert_eq!(ctl.display(), Display::Photo(url.clone()));
        assert_eq!(registry.live_count(), 1);

        let stored = ctl.store().get(PROFILE_PHOTO_KEY).await.unwrap().unwrap();
        assert_eq!(stored.media_type, "image/jpeg");
        assert_eq!(registry.resolve(&url).as_deref(), Some(&stored));
    }

    #[tokio::test]
    async fn replacing_leaves_exactly_one_live_reference() {
        let (mut ctl, registry) = controller();

        ctl.upload(png(100, 100)).await;
        let first = match ctl.state() {
            PhotoState::Loaded(url) => url.clone(),
            other => panic!("unexpected {other:?}"),
        };

        ctl.upload(png(50, 80)).await;
        let second = match ctl.state() {
            PhotoState::Loaded(url) => url.clone(),
            other => panic!("unexpected {other:?}"),
        };

        assert_ne!(first, second);
        assert_eq!(registry.live_count(), 1);
        assert!(registry.resolve(&first).is_none());
        assert!(registry.resolve(&second).is_some());
    }

    #[tokio::test]
    async fn bad_file_keeps_previous_photo() {
        let (mut ctl, registry) = controller();
        ctl.upload(png(64, 64)).await;
        let shown = ctl.display();

        let state = ctl.upload(b"not an image".to_vec()).await.clone();
        assert_eq!(state, PhotoState::Error(NOT_AN_IMAGE.to_string()));
        assert_eq!(ctl.display(), shown);
        assert_eq!(registry.live_count(), 1);
    }

    #[tokio::test]
    async fn store_failure_on_upload_is_reported_and_nothing_is_shown() {
        let (mut ctl, registry) = controller();
        ctl.store().fail(true);

        let state = ctl.upload(png(64, 64)).await.clone();
        assert_eq!(state, PhotoState::Error(SAVE_FAILED.to_string()));
        assert_eq!(ctl.display(), Display::Default(DEFAULT_PHOTO_PATH));
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn read_failure_on_mount_falls_back_to_default() {
        let (mut ctl, _) = controller();
        ctl.store().fail(true);

        assert_eq!(ctl.mount().await, &PhotoState::Error(LOAD_FAILED.to_string()));
        assert_eq!(ctl.display(), Display::Default(DEFAULT_PHOTO_PATH));
    }

    #[tokio::test]
    async fn remove_erases_and_revokes() {
        let (mut ctl, registry) = controller();
        ctl.upload(png(64, 64)).await;

        assert_eq!(ctl.remove().await, &PhotoState::Default);
        assert_eq!(registry.live_count(), 0);
        assert!(ctl.store().get(PROFILE_PHOTO_KEY).await.unwrap().is_none());

        // removing twice is fine
        assert_eq!(ctl.remove().await, &PhotoState::Default);
    }

    #[tokio::test]
    async fn failed_remove_keeps_display() {
        let (mut ctl, registry) = controller();
        ctl.upload(png(64, 64)).await;
        ctl.store().fail(true);

        assert_eq!(ctl.remove().await, &PhotoState::Error(REMOVE_FAILED.to_string()));
        assert_eq!(registry.live_count(), 1);
    }

    #[tokio::test]
    async fn dropping_the_controller_releases_its_reference() {
        let (mut ctl, registry) = controller();
        ctl.upload(png(64, 64)).await;
        assert_eq!(registry.live_count(), 1);

        drop(ctl);
        assert_eq!(registry.live_count(), 0);
    }
}
