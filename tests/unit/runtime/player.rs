use std::{io::Cursor, thread};

use super::*;
use crate::{
    assets::fetch::{FrameFetcher, MemoryFetcher},
    beats::{engine::DEFAULT_SLIDE_DISTANCE, model::default_beats},
    foundation::{
        core::{Size, Viewport},
        error::ScrubResult,
    },
    loader::frame_loader::LoaderOpts,
    render::{renderer::SkipReason, surface::PixmapCanvas},
    runtime::host::SimulatedHost,
    sequence::registry::{PathTemplate, SequenceRegistry},
};

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

// Saturated channels only, so resampling and blending reproduce them exactly.
const PALETTE: [[u8; 4]; 5] = [
    [255, 0, 0, 255],
    [0, 255, 0, 255],
    [0, 0, 255, 255],
    [255, 255, 0, 255],
    [255, 0, 255, 255],
];

fn color(i: usize) -> [u8; 4] {
    PALETTE[i]
}

const CYAN: [u8; 4] = [0, 255, 255, 255];

/// Sequence 1: five colored frames (frame 3 missing). Sequence 2: three cyan frames.
fn fixture() -> (SequenceStore, MemoryFetcher) {
    let registry = SequenceRegistry::new(vec![
        FrameSequence::new(1, "colors", 5, PathTemplate::new("/a/{index}.png", 0, 2)),
        FrameSequence::new(2, "cyan", 3, PathTemplate::new("/b/{index}.png", 0, 2)),
    ])
    .unwrap();
    let mut fetcher = MemoryFetcher::new();
    for i in [0usize, 1, 2, 4] {
        fetcher
            .insert(&format!("/a/{i:02}.png"), png(color(i)))
            .unwrap();
    }
    for i in 0..3 {
        fetcher.insert(&format!("/b/{i:02}.png"), png(CYAN)).unwrap();
    }
    (SequenceStore::new(registry), fetcher)
}

/// Delays every fetch under `prefix` so a switch is observed mid-load.
struct Throttled {
    inner: MemoryFetcher,
    prefix: &'static str,
}

impl FrameFetcher for Throttled {
    fn fetch(&self, locator: &str) -> ScrubResult<Vec<u8>> {
        if locator.starts_with(self.prefix) {
            thread::sleep(Duration::from_millis(100));
        }
        self.inner.fetch(locator)
    }
}

fn throttled_player(fetcher: MemoryFetcher, prefix: &'static str) -> ScrollPlayer<PixmapCanvas> {
    let loader = FrameLoader::new(
        Arc::new(Throttled {
            inner: fetcher,
            prefix,
        }),
        LoaderOpts { threads: Some(2) },
    )
    .unwrap();
    let track = BeatTrack::new(default_beats(), DEFAULT_SLIDE_DISTANCE).unwrap();
    ScrollPlayer::new(loader, PixmapCanvas::new(Size::new(16.0, 16.0)), track)
}

fn player(fetcher: MemoryFetcher) -> ScrollPlayer<PixmapCanvas> {
    throttled_player(fetcher, "/b/")
}

fn host() -> SimulatedHost {
    SimulatedHost::new(Viewport::new(100.0), 6.0)
}

fn run_until_running(
    p: &mut ScrollPlayer<PixmapCanvas>,
    store: &SequenceStore,
    host: &mut SimulatedHost,
) {
    for _ in 0..200 {
        if matches!(p.state(), PlayerState::Running { .. }) {
            return;
        }
        p.pump_wait(store, host, Duration::from_millis(50));
    }
    panic!("player never reached running: {:?}", p.state());
}

fn fire(
    p: &mut ScrollPlayer<PixmapCanvas>,
    store: &SequenceStore,
    host: &mut SimulatedHost,
) -> Option<TickReport> {
    let handle = host.take_due_tick().expect("a tick must be scheduled");
    p.tick(store, host, handle)
}

fn center(p: &ScrollPlayer<PixmapCanvas>) -> [u8; 4] {
    let buf = p.surface().buffer();
    buf.get_pixel(buf.width() / 2, buf.height() / 2).0
}

#[test]
fn ready_draws_first_frame_and_starts_loop() {
    let (store, fetcher) = fixture();
    let mut p = player(fetcher);
    let mut h = host();

    assert_eq!(p.state(), PlayerState::Idle);
    p.mount(&store, &mut h);
    assert_eq!(p.state(), PlayerState::Loading { sequence_id: 1 });
    assert!(h.loader().visible);

    run_until_running(&mut p, &store, &mut h);
    assert_eq!(p.state(), PlayerState::Running { sequence_id: 1 });
    assert_eq!(p.last_index(), Some(FrameIndex(0)));
    assert_eq!(center(&p), color(0));
    assert_eq!(h.pending_ticks(), 1);
    assert_eq!(h.resize_listeners(), 1);
    assert_eq!(h.beat_visual(0).unwrap().opacity, 1.0);
    assert_eq!(h.beat_visual(3).unwrap().offset_y, DEFAULT_SLIDE_DISTANCE);
    assert!(!h.loader().visible);
    assert_eq!(p.load_indicator().percent, 100);
}

#[test]
fn tick_redraws_only_when_index_changes() {
    let (store, fetcher) = fixture();
    let mut p = player(fetcher);
    let mut h = host();
    p.mount(&store, &mut h);
    run_until_running(&mut p, &store, &mut h);

    // Tiny scroll: still frame 0.
    h.scroll_to_progress(0.05);
    let r = fire(&mut p, &store, &mut h).unwrap();
    assert_eq!(r.index, FrameIndex(0));
    assert!(r.redraw.is_none());
    let draws = p.stats().draws;

    h.scroll_to_progress(0.5);
    let r = fire(&mut p, &store, &mut h).unwrap();
    assert!((r.progress - 0.5).abs() < 1e-12);
    assert_eq!(r.index, FrameIndex(2));
    assert!(matches!(r.redraw, Some(DrawOutcome::Drawn { .. })));
    assert_eq!(p.stats().draws, draws + 1);
    assert_eq!(center(&p), color(2));

    // Beats follow the same sample: 0.5 is on engineering's rising edge.
    let eng = h.beat_visual(2).unwrap();
    assert!(eng.opacity > 0.0 && eng.opacity < 1.0);
    assert_eq!(h.beat_visual(0).unwrap().opacity, 0.0);

    // Beats are reapplied even without a redraw.
    h.scroll_to_progress(0.51);
    let r = fire(&mut p, &store, &mut h).unwrap();
    assert!(r.redraw.is_none());
    assert!(h.beat_visual(2).unwrap().opacity > eng.opacity);
    assert_eq!(h.pending_ticks(), 1);
}

#[test]
fn missing_frame_is_skipped_and_loop_continues() {
    let (store, fetcher) = fixture();
    let mut p = player(fetcher);
    let mut h = host();
    p.mount(&store, &mut h);
    run_until_running(&mut p, &store, &mut h);
    assert_eq!(p.frames().unwrap().failed_count(), 1);

    h.scroll_to_progress(0.75);
    let r = fire(&mut p, &store, &mut h).unwrap();
    assert_eq!(r.index, FrameIndex(3));
    assert_eq!(
        r.redraw,
        Some(DrawOutcome::Skipped(SkipReason::MissingFrame))
    );
    assert_eq!(h.pending_ticks(), 1);

    h.scroll_to_progress(1.0);
    let r = fire(&mut p, &store, &mut h).unwrap();
    assert_eq!(r.index, FrameIndex(4));
    assert_eq!(center(&p), color(4));
}

#[test]
fn detached_container_keeps_polling() {
    let (store, fetcher) = fixture();
    let mut p = player(fetcher);
    let mut h = host();
    p.mount(&store, &mut h);
    run_until_running(&mut p, &store, &mut h);

    h.set_container_mounted(false);
    assert!(fire(&mut p, &store, &mut h).is_none());
    assert_eq!(h.pending_ticks(), 1);
}

#[test]
fn resize_reallocates_and_redraws_current_frame() {
    let (store, fetcher) = fixture();
    let mut p = player(fetcher);
    let mut h = host();
    p.mount(&store, &mut h);
    run_until_running(&mut p, &store, &mut h);

    h.scroll_to_progress(0.25);
    fire(&mut p, &store, &mut h);
    let allocs = p.surface().buffer_allocations();

    p.surface_mut().set_logical_size(Size::new(32.0, 20.0));
    let out = p.on_resize(&store, &mut h).unwrap();
    assert!(matches!(out, DrawOutcome::Drawn { resized: true, .. }));
    assert_eq!(p.surface().buffer_allocations(), allocs + 1);
    assert_eq!(p.surface().buffer().dimensions(), (32, 20));
    assert_eq!(center(&p), color(1));
}

#[test]
fn unmount_cancels_tick_and_listener() {
    let (store, fetcher) = fixture();
    let mut p = player(fetcher);
    let mut h = host();
    p.mount(&store, &mut h);
    run_until_running(&mut p, &store, &mut h);

    let stale = h.take_due_tick().unwrap();
    assert!(p.tick(&store, &mut h, stale).is_some());
    assert_eq!(h.pending_ticks(), 1);

    p.unmount(&mut h);
    assert_eq!(p.state(), PlayerState::Stopped);
    assert_eq!(h.pending_ticks(), 0);
    assert_eq!(h.resize_listeners(), 0);
    assert!(p.tick(&store, &mut h, stale).is_none());
    assert!(p.on_resize(&store, &mut h).is_none());

    // Pumping a stopped player does nothing.
    p.pump(&store, &mut h);
    assert_eq!(p.state(), PlayerState::Stopped);
}

#[test]
fn switching_sequence_restarts_loop_on_new_frames() {
    let (mut store, fetcher) = fixture();
    let mut p = player(fetcher);
    let mut h = host();
    p.mount(&store, &mut h);
    run_until_running(&mut p, &store, &mut h);
    h.scroll_to_progress(0.5);
    fire(&mut p, &store, &mut h);

    assert!(store.select_id(2).unwrap());
    p.pump(&store, &mut h);
    assert_eq!(p.state(), PlayerState::Loading { sequence_id: 2 });
    assert_eq!(h.pending_ticks(), 0);
    assert_eq!(h.resize_listeners(), 0);
    assert!(p.frames().is_none());
    assert_eq!(p.load_indicator().percent, 0);

    run_until_running(&mut p, &store, &mut h);
    assert_eq!(p.state(), PlayerState::Running { sequence_id: 2 });
    assert_eq!(p.frames().unwrap().sequence_id(), 2);
    assert_eq!(p.frames().unwrap().len(), 3);
    assert_eq!(center(&p), CYAN);
    assert_eq!(h.resize_listeners(), 1);
    assert_eq!(p.stats().loads, 2);

    // Progress 0.5 on a 3-frame sequence is frame 1.
    let r = fire(&mut p, &store, &mut h).unwrap();
    assert_eq!(r.index, FrameIndex(1));
    assert_eq!(center(&p), CYAN);
}

#[test]
fn reselecting_same_sequence_does_not_reload() {
    let (mut store, fetcher) = fixture();
    let mut p = player(fetcher);
    let mut h = host();
    p.mount(&store, &mut h);
    run_until_running(&mut p, &store, &mut h);

    assert!(!store.select_id(1).unwrap());
    p.pump(&store, &mut h);
    assert_eq!(p.state(), PlayerState::Running { sequence_id: 1 });
    assert_eq!(p.stats().loads, 1);
}

#[test]
fn tick_after_unpumped_switch_reloads_instead_of_drawing() {
    let (mut store, fetcher) = fixture();
    let mut p = player(fetcher);
    let mut h = host();
    p.mount(&store, &mut h);
    run_until_running(&mut p, &store, &mut h);
    assert_eq!(center(&p), color(0));
    let draws = p.stats().draws;

    // The host fires its tick before anyone pumps the new selection.
    assert!(store.select_id(2).unwrap());
    h.scroll_to_progress(1.0);
    assert!(fire(&mut p, &store, &mut h).is_none());
    assert_eq!(p.state(), PlayerState::Loading { sequence_id: 2 });
    assert_eq!(p.stats().draws, draws);
    assert_eq!(p.stats().loads, 2);
    assert_eq!(center(&p), color(0));
    assert!(p.frames().is_none());
    assert_eq!(h.pending_ticks(), 0);
    assert_eq!(h.resize_listeners(), 0);

    run_until_running(&mut p, &store, &mut h);
    assert_eq!(p.state(), PlayerState::Running { sequence_id: 2 });
    assert_eq!(center(&p), CYAN);
}

#[test]
fn resize_after_unpumped_switch_reloads_instead_of_drawing() {
    let (mut store, fetcher) = fixture();
    let mut p = player(fetcher);
    let mut h = host();
    p.mount(&store, &mut h);
    run_until_running(&mut p, &store, &mut h);
    let draws = p.stats().draws;

    assert!(store.select_id(2).unwrap());
    assert!(p.on_resize(&store, &mut h).is_none());
    assert_eq!(p.state(), PlayerState::Loading { sequence_id: 2 });
    assert_eq!(p.stats().draws, draws);
    assert_eq!(h.resize_listeners(), 0);
}

#[test]
fn switch_during_load_never_draws_old_frames() {
    let (mut store, fetcher) = fixture();
    // Sequence 1 is the slow one here; its jobs outlive the switch.
    let mut p = throttled_player(fetcher, "/a/");
    let mut h = host();

    p.mount(&store, &mut h);
    assert_eq!(p.state(), PlayerState::Loading { sequence_id: 1 });
    assert!(store.select_id(2).unwrap());
    p.pump(&store, &mut h);
    assert_eq!(p.state(), PlayerState::Loading { sequence_id: 2 });

    run_until_running(&mut p, &store, &mut h);
    assert_eq!(p.state(), PlayerState::Running { sequence_id: 2 });
    assert_eq!(p.frames().unwrap().sequence_id(), 2);
    assert_eq!(p.stats().loads, 2);
    assert_eq!(center(&p), CYAN);

    // Let sequence 1's remaining fetches land on the channel, then keep scrolling.
    thread::sleep(Duration::from_millis(300));
    p.pump(&store, &mut h);
    assert_eq!(p.state(), PlayerState::Running { sequence_id: 2 });
    for progress in [0.5, 1.0, 0.0] {
        h.scroll_to_progress(progress);
        let r = fire(&mut p, &store, &mut h).unwrap();
        assert!(r.index.0 < 3);
        assert_eq!(p.frames().unwrap().sequence_id(), 2);
        assert_eq!(center(&p), CYAN);
    }
    assert_eq!(p.stats().skipped_draws, 0);
}
