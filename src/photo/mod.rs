//! Profile photo capture and persistence.
//!
//! An uploaded image is normalized ([`normalize`]), written to a local
//! [`BlobStore`] under a fixed key and shown through a single owned
//! [`DisplayHandle`] managed by the [`PhotoController`].

mod controller;
mod display;
mod normalize;
mod store;

pub use controller::{Display, PhotoController, PhotoState};
pub use display::{DisplayHandle, DisplayRegistry};
pub use normalize::{normalize, normalize_image, target_dimensions};
pub use store::{BlobStore, MemoryBlobStore, SqliteBlobStore, StoreError};

/// Binary image plus its media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoBlob {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
