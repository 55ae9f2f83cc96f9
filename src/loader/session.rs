use std::sync::Arc;

use smallvec::SmallVec;

use crate::{
    assets::decode::FrameImage,
    foundation::{core::FrameIndex, error::ScrubResult},
    sequence::registry::FrameSequence,
};

/// Frames of one fully resolved load. Failed frames are `None` and draw nothing.
#[derive(Clone, Debug)]
pub struct FrameSet {
    sequence_id: u32,
    frames: Arc<[Option<FrameImage>]>,
}

impl FrameSet {
    /// Build from per-index results.
    pub fn new(sequence_id: u32, frames: Vec<Option<FrameImage>>) -> Self {
        Self {
            sequence_id,
            frames: frames.into(),
        }
    }

    /// Sequence these frames belong to.
    pub fn sequence_id(&self) -> u32 {
        self.sequence_id
    }

    /// Image for `index`, if it loaded.
    pub fn get(&self, index: FrameIndex) -> Option<&FrameImage> {
        self.frames.get(index.0).and_then(Option::as_ref)
    }

    /// Number of frames (loaded or not).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` for a set with no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames that decoded successfully.
    pub fn loaded_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_some()).count()
    }

    /// Frames that failed to fetch or decode.
    pub fn failed_count(&self) -> usize {
        self.len() - self.loaded_count()
    }
}

/// Notifications produced by a live load session.
#[derive(Clone, Debug)]
pub enum LoadEvent {
    /// Completion percentage after another frame resolved.
    Progress {
        /// Sequence being loaded.
        sequence_id: u32,
        /// `round(completed / count * 100)`.
        percent: u8,
    },
    /// Every frame resolved; fired once per session.
    Ready(FrameSet),
}

#[derive(Clone, Debug)]
enum FrameSlot {
    Pending,
    Loaded(FrameImage),
    Failed,
}

/// Bookkeeping for one in-flight preload.
///
/// Pure state: the loader feeds it completions that already passed the generation check.
#[derive(Debug)]
pub struct LoadSession {
    generation: u64,
    sequence: Arc<FrameSequence>,
    slots: Vec<FrameSlot>,
    completed: usize,
    ready: bool,
}

impl LoadSession {
    /// Fresh session with every frame pending.
    pub fn new(generation: u64, sequence: Arc<FrameSequence>) -> Self {
        let slots = vec![FrameSlot::Pending; sequence.count];
        Self {
            generation,
            sequence,
            slots,
            completed: 0,
            ready: false,
        }
    }

    /// Generation token this session answers to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Target sequence.
    pub fn sequence(&self) -> &Arc<FrameSequence> {
        &self.sequence
    }

    /// Frames resolved so far, successes and failures alike.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// `true` once every frame resolved.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Current completion percentage.
    pub fn percent(&self) -> u8 {
        load_percent(self.completed, self.sequence.count)
    }

    /// Record the outcome for `index`.
    ///
    /// Each index counts once; repeats, out-of-range indices and anything after ready are ignored.
    pub fn record(
        &mut self,
        index: FrameIndex,
        outcome: ScrubResult<FrameImage>,
    ) -> SmallVec<[LoadEvent; 2]> {
        let mut events = SmallVec::new();
        if self.ready {
            return events;
        }
        let Some(slot) = self.slots.get_mut(index.0) else {
            tracing::warn!(index = index.0, "completion for out-of-range frame ignored");
            return events;
        };
        if !matches!(slot, FrameSlot::Pending) {
            return events;
        }

        *slot = match outcome {
            Ok(image) => FrameSlot::Loaded(image),
            Err(err) => {
                tracing::warn!(
                    sequence = self.sequence.id,
                    index = index.0,
                    error = %err,
                    "frame failed to load; it will be skipped"
                );
                FrameSlot::Failed
            }
        };
        self.completed += 1;
        events.push(LoadEvent::Progress {
            sequence_id: self.sequence.id,
            percent: self.percent(),
        });

        if self.completed == self.sequence.count {
            self.ready = true;
            let frames = std::mem::take(&mut self.slots)
                .into_iter()
                .map(|slot| match slot {
                    FrameSlot::Loaded(image) => Some(image),
                    FrameSlot::Pending | FrameSlot::Failed => None,
                })
                .collect();
            events.push(LoadEvent::Ready(FrameSet::new(self.sequence.id, frames)));
        }
        events
    }
}

/// `round(done / count * 100)`, with an empty sequence reading as complete.
pub fn load_percent(done: usize, count: usize) -> u8 {
    if count == 0 {
        return 100;
    }
    let pct = (done.min(count) as f64 / count as f64 * 100.0).round();
    pct as u8
}

#[cfg(test)]
#[path = "../../tests/unit/loader/session.rs"]
mod tests;
