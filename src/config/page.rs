use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use crate::{
    beats::{
        engine::{BeatTrack, DEFAULT_SLIDE_DISTANCE},
        model::{StoryBeat, default_beats, validate_beats},
    },
    foundation::error::{ScrubError, ScrubResult},
    loader::frame_loader::LoaderOpts,
    sequence::registry::{FrameSequence, SequenceRegistry, builtin_sequences},
};

/// Default container height, in viewport heights.
pub const DEFAULT_SCROLL_HEIGHT_MULTIPLIER: f64 = 6.0;

fn default_multiplier() -> f64 {
    DEFAULT_SCROLL_HEIGHT_MULTIPLIER
}

fn default_slide_distance() -> f64 {
    DEFAULT_SLIDE_DISTANCE
}

/// Everything a scroll-scrub page needs: the sequence catalog, the overlay beats and layout knobs.
///
/// Loaded from JSON; omitted fields take the defaults of the shipped page.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageConfig {
    /// Sequence catalog in display order.
    pub sequences: Vec<FrameSequence>,
    /// Overlay beats in overlay order.
    #[serde(default)]
    pub beats: Vec<StoryBeat>,
    /// Container height in viewport heights.
    #[serde(default = "default_multiplier")]
    pub scroll_height_multiplier: f64,
    /// Offset of a hidden overlay below its rest position.
    #[serde(default = "default_slide_distance")]
    pub slide_distance: f64,
    /// Loader worker threads; `None` defers to the environment, then to rayon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader_threads: Option<usize>,
}

impl PageConfig {
    /// The shipped product page.
    pub fn builtin() -> Self {
        Self {
            sequences: builtin_sequences(),
            beats: default_beats(),
            scroll_height_multiplier: DEFAULT_SCROLL_HEIGHT_MULTIPLIER,
            slide_distance: DEFAULT_SLIDE_DISTANCE,
            loader_threads: None,
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> ScrubResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| ScrubError::serde(format!("parse page config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON file.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_json_path(path: impl AsRef<Path>) -> ScrubResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrubError::validation(format!("open page config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            ScrubError::serde(format!("parse page config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        tracing::debug!(
            sequences = cfg.sequences.len(),
            beats = cfg.beats.len(),
            "page config loaded"
        );
        Ok(cfg)
    }

    /// Check every invariant the runtime relies on.
    pub fn validate(&self) -> ScrubResult<()> {
        if self.sequences.is_empty() {
            return Err(ScrubError::validation(
                "page config must declare at least one sequence",
            ));
        }
        let mut ids = HashSet::new();
        for seq in &self.sequences {
            seq.validate()?;
            if !ids.insert(seq.id) {
                return Err(ScrubError::validation(format!(
                    "duplicate sequence id {}",
                    seq.id
                )));
            }
        }
        validate_beats(&self.beats)?;
        if !self.scroll_height_multiplier.is_finite() || self.scroll_height_multiplier < 1.0 {
            return Err(ScrubError::validation(
                "scroll_height_multiplier must be finite and >= 1",
            ));
        }
        if !self.slide_distance.is_finite() || self.slide_distance < 0.0 {
            return Err(ScrubError::validation(
                "slide_distance must be finite and >= 0",
            ));
        }
        if self.loader_threads == Some(0) {
            return Err(ScrubError::validation("loader_threads must be >= 1"));
        }
        Ok(())
    }

    /// Sequence catalog.
    pub fn registry(&self) -> ScrubResult<SequenceRegistry> {
        SequenceRegistry::new(self.sequences.clone())
    }

    /// Overlay beats with the configured slide distance.
    pub fn beat_track(&self) -> ScrubResult<BeatTrack> {
        BeatTrack::new(self.beats.clone(), self.slide_distance)
    }

    /// Loader options; an explicit thread count wins over the environment.
    pub fn loader_opts(&self) -> LoaderOpts {
        match self.loader_threads {
            Some(n) => LoaderOpts { threads: Some(n) },
            None => LoaderOpts::default(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/page.rs"]
mod tests;
