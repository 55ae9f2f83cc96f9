use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::ScrubResult;

/// A decoded frame in straight-alpha RGBA8.
///
/// Cheap to clone; pixels are shared.
#[derive(Clone, Debug)]
pub struct FrameImage {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Row-major pixels.
    pub pixels: Arc<image::RgbaImage>,
}

impl FrameImage {
    /// Wrap an already decoded buffer.
    pub fn from_rgba(pixels: image::RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            width,
            height,
            pixels: Arc::new(pixels),
        }
    }

    /// `false` when either natural dimension is zero.
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Natural width / height. Only meaningful when [`is_drawable`](Self::is_drawable).
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Decode encoded image bytes (PNG, JPEG, WebP, ...) into a [`FrameImage`].
pub fn decode_frame(bytes: &[u8]) -> ScrubResult<FrameImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode frame from memory")?;
    Ok(FrameImage::from_rgba(dyn_img.to_rgba8()))
}
