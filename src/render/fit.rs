use crate::foundation::core::{Rect, Size};

/// Destination rectangle that scales an `image_w x image_h` source to fully cover `canvas`,
/// centering the crop on the overflowing axis.
///
/// A wider-than-canvas image fits the canvas height and overflows horizontally; otherwise it fits
/// the width and overflows vertically. Callers guarantee non-zero sizes on both sides.
pub fn cover_fit(image_w: f64, image_h: f64, canvas: Size) -> Rect {
    let image_aspect = image_w / image_h;
    let canvas_aspect = canvas.width / canvas.height;

    if image_aspect > canvas_aspect {
        let draw_h = canvas.height;
        let draw_w = canvas.height * image_aspect;
        Rect::from_origin_size(((canvas.width - draw_w) / 2.0, 0.0), (draw_w, draw_h))
    } else {
        let draw_w = canvas.width;
        let draw_h = canvas.width / image_aspect;
        Rect::from_origin_size((0.0, (canvas.height - draw_h) / 2.0), (draw_w, draw_h))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
