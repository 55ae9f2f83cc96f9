use std::collections::VecDeque;

use crate::{
    beats::{engine::BeatVisual, model::StoryBeat},
    foundation::core::{ContainerRect, Viewport},
    loader::indicator::LoadIndicator,
    scroll::progress::container_height_for,
};

/// Handle of a scheduled display-refresh callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Environment services the player depends on.
///
/// The host owns the real clock, layout and overlay elements. It calls
/// [`ScrollPlayer::tick`](crate::ScrollPlayer::tick) when a requested tick fires and
/// [`ScrollPlayer::on_resize`](crate::ScrollPlayer::on_resize) while a resize listener is
/// registered.
pub trait Host {
    /// Current viewport metrics.
    fn viewport(&self) -> Viewport;
    /// Scroll container geometry, or `None` while it is not laid out.
    fn container_rect(&self) -> Option<ContainerRect>;
    /// Schedule one callback on the next display refresh.
    fn request_tick(&mut self) -> TickHandle;
    /// Cancel a scheduled callback. Unknown handles are ignored.
    fn cancel_tick(&mut self, handle: TickHandle);
    /// Start delivering resize notifications.
    fn add_resize_listener(&mut self);
    /// Stop delivering resize notifications.
    fn remove_resize_listener(&mut self);
    /// Apply opacity/offset to the overlay of beat `index`.
    fn apply_beat(&mut self, index: usize, beat: &StoryBeat, visual: BeatVisual);
    /// Update the loading overlay.
    fn show_loader(&mut self, _indicator: LoadIndicator) {}
}

/// Deterministic in-process host: a page with a sticky scroll container, driven by explicit
/// scroll and refresh calls.
#[derive(Clone, Debug)]
pub struct SimulatedHost {
    viewport: Viewport,
    container_offset: f64,
    height_multiplier: f64,
    scroll_y: f64,
    mounted: bool,
    next_handle: u64,
    pending: VecDeque<TickHandle>,
    resize_listeners: usize,
    visuals: Vec<Option<BeatVisual>>,
    loader: LoadIndicator,
    ticks_requested: u64,
}

impl SimulatedHost {
    /// Page whose container spans `height_multiplier` viewports, starting at the document top.
    pub fn new(viewport: Viewport, height_multiplier: f64) -> Self {
        Self {
            viewport,
            container_offset: 0.0,
            height_multiplier,
            scroll_y: 0.0,
            mounted: true,
            next_handle: 0,
            pending: VecDeque::new(),
            resize_listeners: 0,
            visuals: Vec::new(),
            loader: LoadIndicator::default(),
            ticks_requested: 0,
        }
    }

    /// Place the container `offset` pixels below the document top (content above it).
    pub fn with_container_offset(mut self, offset: f64) -> Self {
        self.container_offset = offset;
        self
    }

    /// Document scroll position.
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Set the document scroll position.
    pub fn set_scroll_y(&mut self, y: f64) {
        self.scroll_y = y;
    }

    /// Scroll so the container reads `progress` (clamped to `[0, 1]`).
    pub fn scroll_to_progress(&mut self, progress: f64) {
        let range = self.container_height() - self.viewport.height;
        self.scroll_y = self.container_offset + range.max(0.0) * progress.clamp(0.0, 1.0);
    }

    /// Change viewport metrics (a window resize). The caller notifies the player.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Detach/attach the container from layout.
    pub fn set_container_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    /// Layout height of the container.
    pub fn container_height(&self) -> f64 {
        container_height_for(self.viewport.height, self.height_multiplier)
    }

    /// Pop the next due tick, as a display refresh would.
    pub fn take_due_tick(&mut self) -> Option<TickHandle> {
        self.pending.pop_front()
    }

    /// Ticks scheduled and not yet fired or cancelled.
    pub fn pending_ticks(&self) -> usize {
        self.pending.len()
    }

    /// Total `request_tick` calls.
    pub fn ticks_requested(&self) -> u64 {
        self.ticks_requested
    }

    /// Registered resize listeners.
    pub fn resize_listeners(&self) -> usize {
        self.resize_listeners
    }

    /// Last visual applied to overlay `index`.
    pub fn beat_visual(&self, index: usize) -> Option<BeatVisual> {
        self.visuals.get(index).copied().flatten()
    }

    /// Loading overlay state.
    pub fn loader(&self) -> LoadIndicator {
        self.loader
    }
}

impl Host for SimulatedHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn container_rect(&self) -> Option<ContainerRect> {
        self.mounted.then(|| ContainerRect {
            top: self.container_offset - self.scroll_y,
            height: self.container_height(),
        })
    }

    fn request_tick(&mut self) -> TickHandle {
        self.next_handle += 1;
        self.ticks_requested += 1;
        let handle = TickHandle(self.next_handle);
        self.pending.push_back(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        self.pending.retain(|h| *h != handle);
    }

    fn add_resize_listener(&mut self) {
        self.resize_listeners += 1;
    }

    fn remove_resize_listener(&mut self) {
        self.resize_listeners = self.resize_listeners.saturating_sub(1);
    }

    fn apply_beat(&mut self, index: usize, _beat: &StoryBeat, visual: BeatVisual) {
        if self.visuals.len() <= index {
            self.visuals.resize(index + 1, None);
        }
        self.visuals[index] = Some(visual);
    }

    fn show_loader(&mut self, indicator: LoadIndicator) {
        self.loader = indicator;
    }
}
