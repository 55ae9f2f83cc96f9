use smallvec::SmallVec;

use crate::{
    beats::model::{StoryBeat, validate_beats},
    foundation::error::{ScrubError, ScrubResult},
};

/// Default slide distance: a hidden overlay sits this many logical pixels below its rest position.
pub const DEFAULT_SLIDE_DISTANCE: f64 = 24.0;

/// Opacity of `beat` at `progress`, in `[0, 1]`.
///
/// Zero outside `[start, end]`, one on `[peak_start, peak_end]`, linear ramps in between. A ramp of
/// zero width (peak touching the range boundary) is an instantaneous jump to full opacity.
pub fn opacity_of(progress: f64, beat: &StoryBeat) -> f64 {
    let (start, end) = (beat.start(), beat.end());
    let (peak_start, peak_end) = (beat.peak_start(), beat.peak_end());

    if !progress.is_finite() || progress < start || progress > end {
        return 0.0;
    }
    if peak_start <= progress && progress <= peak_end {
        return 1.0;
    }
    if progress < peak_start {
        let span = peak_start - start;
        if span <= 0.0 {
            return 1.0;
        }
        return ((progress - start) / span).clamp(0.0, 1.0);
    }
    let span = end - peak_end;
    if span <= 0.0 {
        return 1.0;
    }
    (1.0 - (progress - peak_end) / span).clamp(0.0, 1.0)
}

/// Visual state applied to one overlay element.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BeatVisual {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Downward offset in logical pixels: `slide_distance * (1 - opacity)`.
    pub offset_y: f64,
}

impl BeatVisual {
    /// Derive the offset from `opacity`.
    pub fn from_opacity(opacity: f64, slide_distance: f64) -> Self {
        Self {
            opacity,
            offset_y: slide_distance * (1.0 - opacity),
        }
    }

    /// CSS transform string for web hosts.
    pub fn css_transform(&self) -> String {
        format!("translateY({}px)", self.offset_y)
    }
}

/// The page's beats plus the slide distance shared by all overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct BeatTrack {
    beats: Vec<StoryBeat>,
    slide_distance: f64,
}

impl BeatTrack {
    /// Validate and build.
    pub fn new(beats: Vec<StoryBeat>, slide_distance: f64) -> ScrubResult<Self> {
        validate_beats(&beats)?;
        if !slide_distance.is_finite() || slide_distance < 0.0 {
            return Err(ScrubError::validation(
                "slide_distance must be finite and >= 0",
            ));
        }
        Ok(Self {
            beats,
            slide_distance,
        })
    }

    /// Beats in overlay order.
    pub fn beats(&self) -> &[StoryBeat] {
        &self.beats
    }

    /// Shared slide distance.
    pub fn slide_distance(&self) -> f64 {
        self.slide_distance
    }

    /// Visual for every beat at `progress`, in beat order.
    pub fn evaluate(&self, progress: f64) -> SmallVec<[BeatVisual; 8]> {
        self.beats
            .iter()
            .map(|b| BeatVisual::from_opacity(opacity_of(progress, b), self.slide_distance))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/beats/engine.rs"]
mod tests;
