use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    time::{Duration, Instant},
};

use crate::{
    assets::{
        decode::{FrameImage, decode_frame},
        fetch::FrameFetcher,
    },
    foundation::{
        core::FrameIndex,
        error::{ScrubError, ScrubResult},
    },
    loader::session::{FrameSet, LoadEvent, LoadSession},
    sequence::registry::FrameSequence,
};

/// Environment override for the worker count.
pub const LOADER_THREADS_ENV: &str = "FRAMESCRUB_LOADER_THREADS";

/// Loader construction options.
#[derive(Clone, Debug)]
pub struct LoaderOpts {
    /// Worker threads for fetch+decode. `None` lets rayon pick.
    pub threads: Option<usize>,
}

impl Default for LoaderOpts {
    fn default() -> Self {
        let threads = std::env::var(LOADER_THREADS_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0);
        Self { threads }
    }
}

struct Completion {
    generation: u64,
    index: FrameIndex,
    outcome: ScrubResult<FrameImage>,
}

/// Preloads whole sequences in parallel and reports progress on the caller's thread.
///
/// Every [`load`](Self::load) starts a new generation. Workers tag their completions with the
/// generation they were spawned for; [`poll`](Self::poll) applies only completions of the live
/// generation, so a superseded or cancelled session can never emit events or publish frames.
pub struct FrameLoader {
    fetcher: Arc<dyn FrameFetcher>,
    pool: rayon::ThreadPool,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    live: Arc<AtomicU64>,
    generation: u64,
    session: Option<LoadSession>,
}

impl std::fmt::Debug for FrameLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoader")
            .field("generation", &self.generation)
            .field("threads", &self.pool.current_num_threads())
            .field("session", &self.session)
            .finish()
    }
}

impl FrameLoader {
    /// Build a loader over `fetcher`.
    pub fn new(fetcher: Arc<dyn FrameFetcher>, opts: LoaderOpts) -> ScrubResult<Self> {
        let pool = build_thread_pool(opts.threads)?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            fetcher,
            pool,
            tx,
            rx,
            live: Arc::new(AtomicU64::new(0)),
            generation: 0,
            session: None,
        })
    }

    /// Start preloading `sequence`, superseding any session in flight. Returns the new generation.
    #[tracing::instrument(skip(self, sequence), fields(sequence = sequence.id, count = sequence.count))]
    pub fn load(&mut self, sequence: Arc<FrameSequence>) -> u64 {
        if let Some(prev) = &self.session
            && !prev.is_ready()
        {
            tracing::debug!(
                superseded = prev.sequence().id,
                completed = prev.completed(),
                "superseding in-flight load"
            );
        }

        self.generation += 1;
        let generation = self.generation;
        self.live.store(generation, Ordering::Release);

        for (index, locator) in sequence.locators() {
            let fetcher = Arc::clone(&self.fetcher);
            let live = Arc::clone(&self.live);
            let tx = self.tx.clone();
            self.pool.spawn(move || {
                // Skip the IO for sessions that were superseded before this job started.
                if live.load(Ordering::Acquire) != generation {
                    return;
                }
                let outcome = fetcher.fetch(&locator).and_then(|b| decode_frame(&b));
                let _ = tx.send(Completion {
                    generation,
                    index,
                    outcome,
                });
            });
        }

        tracing::debug!(generation, "load started");
        self.session = Some(LoadSession::new(generation, sequence));
        generation
    }

    /// Drop the live session; its pending completions become unobservable.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!(generation = self.generation, "load cancelled");
        }
        self.generation += 1;
        self.live.store(self.generation, Ordering::Release);
    }

    /// Generation of the most recent `load`/`cancel`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sequence of the live session.
    pub fn active_sequence(&self) -> Option<&Arc<FrameSequence>> {
        self.session.as_ref().map(LoadSession::sequence)
    }

    /// `true` while a live session has unresolved frames.
    pub fn is_loading(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.is_ready())
    }

    /// Apply every completion that has already arrived, without blocking.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Ok(c) = self.rx.try_recv() {
            self.apply(c, &mut events);
        }
        events
    }

    /// Block up to `timeout` for at least one live event, then drain whatever else arrived.
    pub fn wait(&mut self, timeout: Duration) -> Vec<LoadEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();
        while events.is_empty() && self.is_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(c) => self.apply(c, &mut events),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        events.extend(self.poll());
        events
    }

    /// Block until the live session is ready, or fail after `timeout`.
    pub fn wait_ready(&mut self, timeout: Duration) -> ScrubResult<FrameSet> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            for event in self.wait(remaining) {
                if let LoadEvent::Ready(set) = event {
                    return Ok(set);
                }
            }
            if !self.is_loading() {
                return Err(ScrubError::loader("no load in flight"));
            }
            if Instant::now() >= deadline {
                return Err(ScrubError::loader(format!(
                    "load did not finish within {timeout:?}"
                )));
            }
        }
    }

    fn apply(&mut self, c: Completion, events: &mut Vec<LoadEvent>) {
        let Some(session) = self.session.as_mut() else {
            tracing::trace!(generation = c.generation, "completion without live session dropped");
            return;
        };
        if c.generation != session.generation() {
            tracing::trace!(
                generation = c.generation,
                live = session.generation(),
                index = c.index.0,
                "stale completion dropped"
            );
            return;
        }
        for event in session.record(c.index, c.outcome) {
            if let LoadEvent::Ready(set) = &event {
                tracing::debug!(
                    sequence = set.sequence_id(),
                    loaded = set.loaded_count(),
                    failed = set.failed_count(),
                    "load ready"
                );
            }
            events.push(event);
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> ScrubResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ScrubError::validation(
            "loader 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("framescrub-load-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ScrubError::loader(format!("failed to build loader thread pool: {e}")))
}
