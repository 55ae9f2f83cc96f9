use crate::{
    assets::decode::FrameImage,
    foundation::core::{Rect, Size},
};

/// A drawing target with a logical (CSS) box and a separately sized backing buffer.
///
/// Mirrors a 2D canvas element: layout decides [`logical_size`](Surface::logical_size), the owner
/// sizes the pixel buffer, and draw coordinates are logical pixels mapped through the current
/// scale.
pub trait Surface {
    /// Current layout size in logical pixels.
    fn logical_size(&self) -> Size;
    /// Reallocate the backing buffer. Contents are discarded.
    fn resize_buffer(&mut self, width_px: u32, height_px: u32);
    /// Logical-to-physical scale applied to subsequent draws.
    fn set_scale(&mut self, scale: f64);
    /// Clear the whole buffer to transparent.
    fn clear(&mut self);
    /// Draw `image` stretched into `dest` (logical coordinates, may extend past the edges).
    fn draw_image(&mut self, image: &FrameImage, dest: Rect);
}

/// CPU canvas backed by an [`image::RgbaImage`].
#[derive(Clone, Debug)]
pub struct PixmapCanvas {
    logical: Size,
    buffer: image::RgbaImage,
    scale: f64,
    buffer_allocations: u64,
    draws: u64,
}

impl PixmapCanvas {
    /// Canvas laid out at `logical` with an empty buffer, like a fresh canvas element.
    pub fn new(logical: Size) -> Self {
        Self {
            logical,
            buffer: image::RgbaImage::new(0, 0),
            scale: 1.0,
            buffer_allocations: 0,
            draws: 0,
        }
    }

    /// Change the layout size (what a window resize does to a 100%-sized canvas).
    pub fn set_logical_size(&mut self, logical: Size) {
        self.logical = logical;
    }

    /// Backing pixels.
    pub fn buffer(&self) -> &image::RgbaImage {
        &self.buffer
    }

    /// How many times the buffer was reallocated.
    pub fn buffer_allocations(&self) -> u64 {
        self.buffer_allocations
    }

    /// How many images were drawn.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl Surface for PixmapCanvas {
    fn logical_size(&self) -> Size {
        self.logical
    }

    fn resize_buffer(&mut self, width_px: u32, height_px: u32) {
        self.buffer = image::RgbaImage::new(width_px, height_px);
        self.buffer_allocations += 1;
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn clear(&mut self) {
        for px in self.buffer.pixels_mut() {
            *px = image::Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_image(&mut self, image: &FrameImage, dest: Rect) {
        let (bw, bh) = self.buffer.dimensions();
        let (iw, ih) = (f64::from(image.width), f64::from(image.height));
        let dx = dest.x0 * self.scale;
        let dy = dest.y0 * self.scale;
        let dw = dest.width() * self.scale;
        let dh = dest.height() * self.scale;
        if !(dx.is_finite() && dy.is_finite() && dw.is_finite() && dh.is_finite())
            || dw <= 0.0
            || dh <= 0.0
            || iw <= 0.0
            || ih <= 0.0
        {
            return;
        }

        // Only the part of `dest` that lands on the buffer is sampled and scaled.
        let tx0 = dx.max(0.0).round();
        let ty0 = dy.max(0.0).round();
        let tx1 = (dx + dw).min(f64::from(bw)).round();
        let ty1 = (dy + dh).min(f64::from(bh)).round();
        if tx1 - tx0 < 1.0 || ty1 - ty0 < 1.0 {
            return;
        }

        let sx0 = ((tx0 - dx) / dw * iw).floor().clamp(0.0, iw - 1.0);
        let sy0 = ((ty0 - dy) / dh * ih).floor().clamp(0.0, ih - 1.0);
        let sx1 = ((tx1 - dx) / dw * iw).ceil().clamp(sx0 + 1.0, iw);
        let sy1 = ((ty1 - dy) / dh * ih).ceil().clamp(sy0 + 1.0, ih);

        let visible = image::imageops::crop_imm(
            image.pixels.as_ref(),
            sx0 as u32,
            sy0 as u32,
            (sx1 - sx0) as u32,
            (sy1 - sy0) as u32,
        )
        .to_image();
        let scaled = image::imageops::resize(
            &visible,
            (tx1 - tx0) as u32,
            (ty1 - ty0) as u32,
            image::imageops::FilterType::Triangle,
        );
        image::imageops::overlay(&mut self.buffer, &scaled, tx0 as i64, ty0 as i64);
        self.draws += 1;
    }
}
