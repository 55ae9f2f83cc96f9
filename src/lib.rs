//! framescrub is a scroll-driven image-sequence player.
//!
//! It keeps a drawing surface and a set of text overlays synchronized with the scroll position of
//! a tall container: scroll progress picks one frame of a preloaded still sequence, which is
//! cover-fitted onto the canvas, and every overlay ("story beat") fades and slides along its own
//! progress window.
//!
//! # Pipeline overview
//!
//! 1. **Select**: a [`SequenceStore`] holds the active [`FrameSequence`] of a [`SequenceRegistry`]
//! 2. **Load**: a [`FrameLoader`] fetches and decodes every frame in parallel into a [`FrameSet`]
//! 3. **Sample**: per tick, container geometry becomes progress in `[0, 1]` and a [`FrameIndex`]
//! 4. **Draw**: a [`FrameRenderer`] paints the frame onto a [`Surface`] with [`cover_fit`]
//! 5. **Overlay**: a [`BeatTrack`] turns the same progress into a [`BeatVisual`] per beat
//!
//! [`ScrollPlayer`] drives these steps. It is host-driven: the embedding environment implements
//! [`Host`] (geometry, refresh scheduling, resize notifications, overlay elements) and forwards
//! callbacks. [`SimulatedHost`] is a deterministic in-process host for tools and tests.
//!
//! The key constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded state**: all player state lives on the caller's thread; only loader workers
//!   run elsewhere and they communicate by message.
//! - **Stale-proof loads**: results of a superseded load never reach the canvas.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod beats;
mod config;
mod foundation;
mod loader;
mod render;
mod runtime;
mod scroll;
mod sequence;

pub use assets::decode::{FrameImage, decode_frame};
pub use assets::fetch::{FrameFetcher, FsFetcher, MemoryFetcher, normalize_locator};
pub use beats::engine::{BeatTrack, BeatVisual, DEFAULT_SLIDE_DISTANCE, opacity_of};
pub use beats::model::{StoryBeat, default_beats, validate_beats};
pub use config::page::{DEFAULT_SCROLL_HEIGHT_MULTIPLIER, PageConfig};
pub use foundation::core::{ContainerRect, FrameIndex, Rect, Size, Viewport};
pub use foundation::error::{ScrubError, ScrubResult};
pub use loader::frame_loader::{FrameLoader, LOADER_THREADS_ENV, LoaderOpts};
pub use loader::indicator::{LoadIndicator, RING_RADIUS};
pub use loader::session::{FrameSet, LoadEvent, LoadSession, load_percent};
pub use render::fit::cover_fit;
pub use render::renderer::{CanvasDrawState, DrawOutcome, FrameRenderer, SkipReason};
pub use render::surface::{PixmapCanvas, Surface};
pub use runtime::host::{Host, SimulatedHost, TickHandle};
pub use runtime::player::{PlayerState, PlayerStats, ScrollPlayer, TickReport};
pub use scroll::progress::{
    container_height_for, frame_index_for_progress, sample_progress, scroll_range,
};
pub use sequence::registry::{FrameSequence, PathTemplate, SequenceRegistry, builtin_sequences};
pub use sequence::selection::SequenceStore;
