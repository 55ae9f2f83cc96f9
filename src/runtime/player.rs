use std::{sync::Arc, time::Duration};

use crate::{
    beats::engine::BeatTrack,
    foundation::core::FrameIndex,
    loader::{
        frame_loader::FrameLoader,
        indicator::LoadIndicator,
        session::{FrameSet, LoadEvent},
    },
    render::{
        renderer::{DrawOutcome, FrameRenderer},
        surface::Surface,
    },
    runtime::host::{Host, TickHandle},
    scroll::progress::{frame_index_for_progress, sample_progress},
    sequence::{registry::FrameSequence, selection::SequenceStore},
};

/// Lifecycle of a [`ScrollPlayer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    /// Not mounted yet.
    Idle,
    /// Preloading the frames of `sequence_id`.
    Loading {
        /// Sequence being loaded.
        sequence_id: u32,
    },
    /// Ticking against scroll position.
    Running {
        /// Sequence on screen.
        sequence_id: u32,
    },
    /// Unmounted; nothing scheduled, nothing listening.
    Stopped,
}

/// What one tick observed and did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// Sampled progress.
    pub progress: f64,
    /// Quantized frame index.
    pub index: FrameIndex,
    /// Draw result when the index changed; `None` when the canvas was left alone.
    pub redraw: Option<DrawOutcome>,
}

/// Counters for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Ticks that sampled geometry.
    pub ticks: u64,
    /// Draw attempts (index changes, ready entry, resizes).
    pub draws: u64,
    /// Draw attempts that painted nothing.
    pub skipped_draws: u64,
    /// Load sessions started.
    pub loads: u64,
}

/// Render loop controller: keeps a canvas and a set of overlays in sync with scroll position.
///
/// The player exclusively owns its surface. The host drives it:
/// [`mount`](Self::mount) once, [`pump`](Self::pump) on every event-loop turn to deliver loader
/// results and selection changes, [`tick`](Self::tick) for every fired tick handle,
/// [`on_resize`](Self::on_resize) for resize notifications, and [`unmount`](Self::unmount) on
/// teardown.
#[derive(Debug)]
pub struct ScrollPlayer<S: Surface> {
    loader: FrameLoader,
    surface: S,
    renderer: FrameRenderer,
    track: BeatTrack,
    state: PlayerState,
    seen_revision: u64,
    frames: Option<FrameSet>,
    last_index: Option<FrameIndex>,
    scheduled: Option<TickHandle>,
    listening_resize: bool,
    load_percent: u8,
    stats: PlayerStats,
}

impl<S: Surface> ScrollPlayer<S> {
    /// Player over `surface` with overlays from `track`.
    pub fn new(loader: FrameLoader, surface: S, track: BeatTrack) -> Self {
        Self {
            loader,
            surface,
            renderer: FrameRenderer::new(),
            track,
            state: PlayerState::Idle,
            seen_revision: 0,
            frames: None,
            last_index: None,
            scheduled: None,
            listening_resize: false,
            load_percent: 0,
            stats: PlayerStats::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Last index the loop asked to draw.
    pub fn last_index(&self) -> Option<FrameIndex> {
        self.last_index
    }

    /// Frames of the running sequence.
    pub fn frames(&self) -> Option<&FrameSet> {
        self.frames.as_ref()
    }

    /// The owned surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access for layout changes; call [`on_resize`](Self::on_resize) after.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Beat configuration.
    pub fn track(&self) -> &BeatTrack {
        &self.track
    }

    /// Diagnostics counters.
    pub fn stats(&self) -> PlayerStats {
        self.stats
    }

    /// Loading overlay state.
    pub fn load_indicator(&self) -> LoadIndicator {
        LoadIndicator {
            percent: self.load_percent,
            visible: !matches!(self.state, PlayerState::Running { .. }),
        }
    }

    /// Start preloading the active sequence. No-op unless idle or stopped.
    pub fn mount(&mut self, store: &SequenceStore, host: &mut dyn Host) {
        if !matches!(self.state, PlayerState::Idle | PlayerState::Stopped) {
            return;
        }
        self.start_load(store, host);
    }

    /// Deliver selection changes and loader results. Never blocks.
    pub fn pump(&mut self, store: &SequenceStore, host: &mut dyn Host) {
        if !self.sync_selection(store, host) {
            return;
        }
        let events = self.loader.poll();
        self.handle_events(events, host);
    }

    /// Like [`pump`](Self::pump), but waits up to `timeout` for loader progress.
    pub fn pump_wait(&mut self, store: &SequenceStore, host: &mut dyn Host, timeout: Duration) {
        if !self.sync_selection(store, host) {
            return;
        }
        let events = self.loader.wait(timeout);
        self.handle_events(events, host);
    }

    /// Run one display-refresh callback.
    ///
    /// Samples progress, redraws only when the quantized index changed, then applies every beat's
    /// visual from the same sample, and schedules the next tick. Handles that are not the one
    /// currently scheduled (cancelled or superseded) are ignored.
    ///
    /// A selection change not yet seen by [`pump`](Self::pump) stops the loop and starts the new
    /// load instead; the old frames are never drawn for the new selection.
    pub fn tick(
        &mut self,
        store: &SequenceStore,
        host: &mut dyn Host,
        handle: TickHandle,
    ) -> Option<TickReport> {
        if self.scheduled != Some(handle) {
            return None;
        }
        self.scheduled = None;
        if !matches!(self.state, PlayerState::Running { .. }) {
            return None;
        }
        if self.selection_changed(store) {
            self.sync_selection(store, host);
            return None;
        }

        let report = match host.container_rect() {
            Some(rect) => {
                let viewport = host.viewport();
                let progress = sample_progress(rect, viewport);
                let count = self.frames.as_ref().map_or(0, FrameSet::len);
                let index = frame_index_for_progress(progress, count);

                let redraw = if self.last_index != Some(index) {
                    tracing::trace!(index = index.0, progress, "frame changed");
                    self.last_index = Some(index);
                    Some(self.draw(index, viewport.effective_dpr()))
                } else {
                    None
                };

                self.apply_beats(progress, host);
                self.stats.ticks += 1;
                Some(TickReport {
                    progress,
                    index,
                    redraw,
                })
            }
            None => None,
        };

        self.scheduled = Some(host.request_tick());
        report
    }

    /// Handle a resize notification: drop the cached canvas size and redraw the current frame.
    pub fn on_resize(
        &mut self,
        store: &SequenceStore,
        host: &mut dyn Host,
    ) -> Option<DrawOutcome> {
        if !matches!(self.state, PlayerState::Running { .. }) || !self.listening_resize {
            return None;
        }
        if self.selection_changed(store) {
            self.sync_selection(store, host);
            return None;
        }
        self.renderer.invalidate_size();
        let index = self.last_index.unwrap_or(FrameIndex(0));
        Some(self.draw(index, host.viewport().effective_dpr()))
    }

    /// Tear down: cancel the scheduled tick, drop the resize listener and the in-flight load.
    pub fn unmount(&mut self, host: &mut dyn Host) {
        self.stop_loop(host);
        self.loader.cancel();
        self.frames = None;
        self.last_index = None;
        if self.state != PlayerState::Stopped {
            tracing::info!("player stopped");
        }
        self.state = PlayerState::Stopped;
    }

    /// Returns `false` when the player is not active and should not consume loader output.
    fn selection_changed(&self, store: &SequenceStore) -> bool {
        store.revision() != self.seen_revision
    }

    fn sync_selection(&mut self, store: &SequenceStore, host: &mut dyn Host) -> bool {
        if matches!(self.state, PlayerState::Idle | PlayerState::Stopped) {
            return false;
        }
        if self.selection_changed(store) {
            self.stop_loop(host);
            self.start_load(store, host);
        }
        true
    }

    fn start_load(&mut self, store: &SequenceStore, host: &mut dyn Host) {
        let sequence: Arc<FrameSequence> = Arc::clone(store.active());
        self.seen_revision = store.revision();
        self.frames = None;
        self.last_index = None;
        self.load_percent = 0;
        self.renderer.reset();
        self.state = PlayerState::Loading {
            sequence_id: sequence.id,
        };
        tracing::info!(sequence = sequence.id, frames = sequence.count, "loading");
        self.loader.load(sequence);
        self.stats.loads += 1;
        host.show_loader(self.load_indicator());
    }

    fn handle_events(&mut self, events: Vec<LoadEvent>, host: &mut dyn Host) {
        let PlayerState::Loading { sequence_id } = self.state else {
            return;
        };
        for event in events {
            match event {
                LoadEvent::Progress {
                    sequence_id: id,
                    percent,
                } if id == sequence_id => {
                    self.load_percent = percent;
                    host.show_loader(self.load_indicator());
                }
                LoadEvent::Ready(set) if set.sequence_id() == sequence_id => {
                    self.enter_running(set, host);
                    return;
                }
                LoadEvent::Progress { .. } | LoadEvent::Ready(_) => {}
            }
        }
    }

    fn enter_running(&mut self, set: FrameSet, host: &mut dyn Host) {
        let sequence_id = set.sequence_id();
        self.frames = Some(set);
        self.state = PlayerState::Running { sequence_id };
        tracing::info!(sequence = sequence_id, "running");
        host.show_loader(self.load_indicator());

        let dpr = host.viewport().effective_dpr();
        self.last_index = Some(FrameIndex(0));
        self.draw(FrameIndex(0), dpr);
        self.apply_beats(0.0, host);

        if !self.listening_resize {
            host.add_resize_listener();
            self.listening_resize = true;
        }
        self.scheduled = Some(host.request_tick());
    }

    fn stop_loop(&mut self, host: &mut dyn Host) {
        if let Some(handle) = self.scheduled.take() {
            host.cancel_tick(handle);
        }
        if self.listening_resize {
            host.remove_resize_listener();
            self.listening_resize = false;
        }
    }

    fn draw(&mut self, index: FrameIndex, dpr: f64) -> DrawOutcome {
        let image = self.frames.as_ref().and_then(|f| f.get(index));
        let outcome = self.renderer.draw(&mut self.surface, image, index, dpr);
        self.stats.draws += 1;
        if let DrawOutcome::Skipped(reason) = outcome {
            self.stats.skipped_draws += 1;
            tracing::trace!(index = index.0, ?reason, "draw skipped");
        }
        outcome
    }

    fn apply_beats(&self, progress: f64, host: &mut dyn Host) {
        let visuals = self.track.evaluate(progress);
        for (i, (beat, visual)) in self.track.beats().iter().zip(visuals).enumerate() {
            host.apply_beat(i, beat, visual);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/player.rs"]
mod tests;
