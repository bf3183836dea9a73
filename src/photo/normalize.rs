use crate::constants::{PHOTO_JPEG_QUALITY, PHOTO_MAX_EDGE, PHOTO_MEDIA_TYPE};
use crate::photo::{PhotoBlob, PhotoError};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, ColorType, GenericImageView};

/// Dimensions that fit `max_edge` on the longer side, aspect ratio kept.
/// Images already within bounds are returned unchanged.
pub fn target_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    let scale = f64::from(max_edge) / f64::from(width.max(height));
    let scaled = |v: u32| ((f64::from(v) * scale).round() as u32).clamp(1, max_edge);
    (scaled(width), scaled(height))
}

/// Decode, downsample and re-encode as JPEG. Synchronous and CPU bound.
pub fn normalize_image(bytes: &[u8]) -> Result<PhotoBlob, PhotoError> {
    if bytes.is_empty() {
        return Err(PhotoError::Decode("empty input".to_string()));
    }

    let img = image::load_from_memory(bytes).map_err(|e| PhotoError::Decode(e.to_string()))?;
    let (w, h) = img.dimensions();
    let (tw, th) = target_dimensions(w, h, PHOTO_MAX_EDGE);

    let img = if (tw, th) == (w, h) {
        img
    } else {
        img.resize_exact(tw, th, FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    drop(img);

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, PHOTO_JPEG_QUALITY)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| PhotoError::Encode(e.to_string()))?;

    tracing::debug!(
        "Normalized photo {}x{} -> {}x{} ({} bytes)",
        w,
        h,
        tw,
        th,
        out.len()
    );

    Ok(PhotoBlob {
        bytes: out,
        media_type: PHOTO_MEDIA_TYPE.to_string(),
    })
}

/// Runs [`normalize_image`] on the blocking pool.
pub async fn normalize(bytes: Vec<u8>) -> Result<PhotoBlob, PhotoError> {
    tokio::task::spawn_blocking(move || normalize_image(&bytes))
        .await
        .map_err(|e| PhotoError::Encode(format!("normalize task failed: {e}")))?
}
