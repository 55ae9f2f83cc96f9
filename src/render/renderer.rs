use crate::{
    assets::decode::FrameImage,
    foundation::core::{FrameIndex, Rect, Size},
    render::{fit::cover_fit, surface::Surface},
};

/// What the renderer remembers between draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasDrawState {
    /// Last index actually painted.
    pub last_drawn: Option<FrameIndex>,
    /// Logical size the buffer was last allocated for; zero means "unknown".
    pub logical: Size,
    /// Device pixel ratio the buffer was last allocated for.
    pub dpr: f64,
}

impl Default for CanvasDrawState {
    fn default() -> Self {
        Self {
            last_drawn: None,
            logical: Size::ZERO,
            dpr: 1.0,
        }
    }
}

/// Why a draw request painted nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The frame failed to load (or the set is shorter than the index).
    MissingFrame,
    /// The frame decoded to zero natural dimensions.
    EmptyFrame,
    /// The canvas has no layout size (hidden or detached).
    ZeroSizedCanvas,
}

/// Result of [`FrameRenderer::draw`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOutcome {
    /// The frame was painted into `dest` (logical coordinates).
    Drawn {
        /// Cover-fit destination rectangle.
        dest: Rect,
        /// Whether this draw reallocated the backing buffer.
        resized: bool,
    },
    /// Nothing was painted; the previous contents are untouched.
    Skipped(SkipReason),
}

/// Cover-fit frame painter with buffer-size caching.
#[derive(Clone, Debug, Default)]
pub struct FrameRenderer {
    state: CanvasDrawState,
}

impl FrameRenderer {
    /// Renderer with nothing cached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached state.
    pub fn state(&self) -> CanvasDrawState {
        self.state
    }

    /// Forget the cached buffer size so the next draw reallocates.
    pub fn invalidate_size(&mut self) {
        self.state.logical = Size::ZERO;
    }

    /// Forget everything, as for a new sequence.
    pub fn reset(&mut self) {
        self.state = CanvasDrawState::default();
    }

    /// Paint `image` as frame `index`, cover-fitted to the surface.
    ///
    /// Missing or empty frames and zero-sized canvases are silent no-ops.
    pub fn draw<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        image: Option<&FrameImage>,
        index: FrameIndex,
        dpr: f64,
    ) -> DrawOutcome {
        let Some(image) = image else {
            return DrawOutcome::Skipped(SkipReason::MissingFrame);
        };
        if !image.is_drawable() {
            return DrawOutcome::Skipped(SkipReason::EmptyFrame);
        }

        let logical = surface.logical_size();
        if logical.width.is_nan()
            || logical.height.is_nan()
            || logical.width <= 0.0
            || logical.height <= 0.0
        {
            return DrawOutcome::Skipped(SkipReason::ZeroSizedCanvas);
        }

        let resized = self.state.logical != logical || self.state.dpr != dpr;
        if resized {
            let w = (logical.width * dpr).floor().max(0.0) as u32;
            let h = (logical.height * dpr).floor().max(0.0) as u32;
            surface.resize_buffer(w, h);
            self.state.logical = logical;
            self.state.dpr = dpr;
            tracing::trace!(w, h, dpr, "canvas buffer resized");
        }

        surface.set_scale(dpr);
        let dest = cover_fit(f64::from(image.width), f64::from(image.height), logical);
        surface.clear();
        surface.draw_image(image, dest);
        self.state.last_drawn = Some(index);

        DrawOutcome::Drawn { dest, resized }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
