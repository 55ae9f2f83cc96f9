pub use kurbo::{Rect, Size};

/// 0-based index into a frame sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub usize);

/// Viewport metrics reported by the host at sample time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Inner viewport height in logical (CSS) pixels.
    pub height: f64,
    /// Physical pixels per logical pixel. Non-finite or non-positive values read as `1.0`.
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Viewport with a device pixel ratio of 1.
    pub fn new(height: f64) -> Self {
        Self {
            height,
            device_pixel_ratio: 1.0,
        }
    }

    /// Device pixel ratio with the `|| 1` fallback applied.
    pub fn effective_dpr(self) -> f64 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }
}

/// Bounding geometry of the tall scroll container relative to the viewport.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerRect {
    /// Top edge relative to the viewport top; negative once scrolled past.
    pub top: f64,
    /// Full layout height of the container.
    pub height: f64,
}
