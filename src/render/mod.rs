//! Canvas drawing.

/// Cover-fit placement.
pub mod fit;
/// Frame drawing onto a [`surface::Surface`] with buffer-size caching.
pub mod renderer;
/// Drawing surface abstraction and the CPU pixmap canvas.
pub mod surface;
