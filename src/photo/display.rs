use crate::constants::DISPLAY_URL_PREFIX;
use crate::photo::PhotoBlob;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Resolves display reference URLs to photo bytes while the reference is
/// live. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct DisplayRegistry {
    live: Arc<Mutex<HashMap<String, Arc<PhotoBlob>>>>,
}

impl DisplayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `blob` under a fresh `blob:folio/<uuid>` URL.
    pub fn mint(&self, blob: PhotoBlob) -> DisplayHandle {
        let url = format!("{}{}", DISPLAY_URL_PREFIX, Uuid::new_v4());
        self.lock().insert(url.clone(), Arc::new(blob));
        DisplayHandle {
            url,
            registry: self.clone(),
        }
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<PhotoBlob>> {
        self.lock().get(url).cloned()
    }

    /// Number of references not yet released
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn revoke(&self, url: &str) {
        self.lock().remove(url);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<PhotoBlob>>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owned display reference. Dropping it revokes the URL.
pub struct DisplayHandle {
    url: String,
    registry: DisplayRegistry,
}

impl DisplayHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn blob(&self) -> Option<Arc<PhotoBlob>> {
        self.registry.resolve(&self.url)
    }
}

impl fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DisplayHandle").field(&self.url).finish()
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> PhotoBlob {
        PhotoBlob {
            bytes: vec![0xff, 0xd8, 0xff],
            media_type: "image/jpeg".into(),
        }
    }

    #[test]
    fn minted_urls_are_unique_and_resolvable() {
        let registry = DisplayRegistry::new();
        let a = registry.mint(blob());
        let b = registry.mint(blob());

        assert_ne!(a.url(), b.url());
        assert!(a.url().starts_with("blob:folio/"));
        assert_eq!(registry.resolve(a.url()).as_deref(), Some(&blob()));
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn dropping_a_handle_revokes_it() {
        let registry = DisplayRegistry::new();
        let handle = registry.mint(blob());
        let url = handle.url().to_string();

        drop(handle);
        assert!(registry.resolve(&url).is_none());
        assert_eq!(registry.live_count(), 0);
    }
}
