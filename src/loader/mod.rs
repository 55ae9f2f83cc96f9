//! Sequence preloading.
//!
//! A [`frame_loader::FrameLoader`] fans fetch+decode work out to a rayon pool and folds completions
//! into a [`session::LoadSession`] on the caller's thread.

/// Parallel loader with generation-based cancellation.
pub mod frame_loader;
/// Loading overlay model.
pub mod indicator;
/// Per-load bookkeeping and the loaded frame set.
pub mod session;
