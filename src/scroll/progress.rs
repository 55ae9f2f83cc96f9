use crate::foundation::core::{ContainerRect, FrameIndex, Viewport};

/// Scrollable distance of a container: `container_height - viewport_height`.
pub fn scroll_range(container_height: f64, viewport_height: f64) -> f64 {
    container_height - viewport_height
}

/// Normalized progress through the tall container, in `[0, 1]`.
///
/// A container that is not taller than the viewport has no scroll room and always reads `0`.
/// Non-finite geometry also reads `0`.
pub fn sample_progress(rect: ContainerRect, viewport: Viewport) -> f64 {
    let range = scroll_range(rect.height, viewport.height);
    if range.is_nan() || range <= 0.0 {
        return 0.0;
    }
    let p = -rect.top / range;
    if !p.is_finite() {
        return 0.0;
    }
    p.clamp(0.0, 1.0)
}

/// Quantize progress to a frame: `round(progress * (count - 1))`, clamped to `[0, count - 1]`.
pub fn frame_index_for_progress(progress: f64, count: usize) -> FrameIndex {
    if count == 0 {
        return FrameIndex(0);
    }
    let last = count - 1;
    let p = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let idx = (p * last as f64).round() as usize;
    FrameIndex(idx.min(last))
}

/// Layout height of a container spanning `multiplier` viewports.
pub fn container_height_for(viewport_height: f64, multiplier: f64) -> f64 {
    viewport_height * multiplier
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/progress.rs"]
mod tests;
