use super::*;

#[derive(Debug, Default)]
struct RecordingSurface {
    logical: Size,
    ops: Vec<Op>,
}

#[derive(Debug, PartialEq)]
enum Op {
    Resize(u32, u32),
    Scale(f64),
    Clear,
    Draw(Rect),
}

impl Surface for RecordingSurface {
    fn logical_size(&self) -> Size {
        self.logical
    }
    fn resize_buffer(&mut self, width_px: u32, height_px: u32) {
        self.ops.push(Op::Resize(width_px, height_px));
    }
    fn set_scale(&mut self, scale: f64) {
        self.ops.push(Op::Scale(scale));
    }
    fn clear(&mut self) {
        self.ops.push(Op::Clear);
    }
    fn draw_image(&mut self, _image: &FrameImage, dest: Rect) {
        self.ops.push(Op::Draw(dest));
    }
}

fn frame(w: u32, h: u32) -> FrameImage {
    FrameImage::from_rgba(image::RgbaImage::new(w, h))
}

fn surface(w: f64, h: f64) -> RecordingSurface {
    RecordingSurface {
        logical: Size::new(w, h),
        ops: Vec::new(),
    }
}

#[test]
fn first_draw_allocates_scaled_buffer_then_clears_then_draws() {
    let mut s = surface(400.0, 300.0);
    let mut r = FrameRenderer::new();
    let img = frame(800, 300);

    let out = r.draw(&mut s, Some(&img), FrameIndex(3), 2.0);
    let DrawOutcome::Drawn { dest, resized } = out else {
        panic!("expected draw, got {out:?}");
    };
    assert!(resized);
    assert!((dest.x0 - -200.0).abs() < 1e-9);
    assert_eq!(
        s.ops,
        vec![
            Op::Resize(800, 600),
            Op::Scale(2.0),
            Op::Clear,
            Op::Draw(dest)
        ]
    );
    assert_eq!(r.state().last_drawn, Some(FrameIndex(3)));
    assert_eq!(r.state().logical, Size::new(400.0, 300.0));
}

#[test]
fn unchanged_size_skips_reallocation() {
    let mut s = surface(400.0, 300.0);
    let mut r = FrameRenderer::new();
    let img = frame(16, 9);

    r.draw(&mut s, Some(&img), FrameIndex(0), 1.0);
    s.ops.clear();
    let out = r.draw(&mut s, Some(&img), FrameIndex(1), 1.0);
    assert!(matches!(out, DrawOutcome::Drawn { resized: false, .. }));
    assert!(!s.ops.iter().any(|op| matches!(op, Op::Resize(..))));

    s.logical = Size::new(500.0, 300.0);
    let out = r.draw(&mut s, Some(&img), FrameIndex(1), 1.0);
    assert!(matches!(out, DrawOutcome::Drawn { resized: true, .. }));
}

#[test]
fn invalidate_forces_reallocation() {
    let mut s = surface(10.0, 10.0);
    let mut r = FrameRenderer::new();
    let img = frame(4, 4);
    r.draw(&mut s, Some(&img), FrameIndex(0), 1.0);
    r.invalidate_size();
    s.ops.clear();
    r.draw(&mut s, Some(&img), FrameIndex(0), 1.0);
    assert_eq!(s.ops[0], Op::Resize(10, 10));
}

#[test]
fn missing_empty_and_zero_canvas_are_noops() {
    let mut r = FrameRenderer::new();

    let mut s = surface(100.0, 100.0);
    assert_eq!(
        r.draw(&mut s, None, FrameIndex(0), 1.0),
        DrawOutcome::Skipped(SkipReason::MissingFrame)
    );
    assert_eq!(
        r.draw(&mut s, Some(&frame(0, 0)), FrameIndex(0), 1.0),
        DrawOutcome::Skipped(SkipReason::EmptyFrame)
    );
    assert!(s.ops.is_empty());

    let mut hidden = surface(0.0, 300.0);
    assert_eq!(
        r.draw(&mut hidden, Some(&frame(4, 4)), FrameIndex(0), 1.0),
        DrawOutcome::Skipped(SkipReason::ZeroSizedCanvas)
    );
    assert!(hidden.ops.is_empty());
    assert_eq!(r.state().last_drawn, None);
}

#[test]
fn draws_into_pixmap_canvas() {
    use crate::render::surface::PixmapCanvas;

    let mut canvas = PixmapCanvas::new(Size::new(8.0, 4.0));
    let mut r = FrameRenderer::new();
    let img = FrameImage::from_rgba(image::RgbaImage::from_pixel(
        2,
        1,
        image::Rgba([200, 10, 10, 255]),
    ));
    let out = r.draw(&mut canvas, Some(&img), FrameIndex(0), 1.5);
    assert!(matches!(out, DrawOutcome::Drawn { .. }));
    assert_eq!(canvas.buffer().dimensions(), (12, 6));
    assert_eq!(canvas.buffer().get_pixel(6, 3).0, [200, 10, 10, 255]);
}

#[test]
fn extreme_aspect_frame_draws_within_canvas_bounds() {
    use crate::render::surface::PixmapCanvas;

    let mut canvas = PixmapCanvas::new(Size::new(400.0, 300.0));
    let mut r = FrameRenderer::new();
    let img = FrameImage::from_rgba(image::RgbaImage::from_pixel(
        2000,
        1,
        image::Rgba([0, 255, 0, 255]),
    ));
    let out = r.draw(&mut canvas, Some(&img), FrameIndex(0), 1.0);
    let DrawOutcome::Drawn { dest, .. } = out else {
        panic!("expected a draw: {out:?}");
    };
    // Cover fit overflows the canvas by three orders of magnitude.
    assert_eq!(dest.width(), 600_000.0);
    assert_eq!(canvas.buffer().dimensions(), (400, 300));
    for (x, y) in [(0, 0), (399, 0), (0, 299), (399, 299), (200, 150)] {
        assert_eq!(canvas.buffer().get_pixel(x, y).0, [0, 255, 0, 255]);
    }
}
