use std::collections::HashSet;

use crate::foundation::error::{ScrubError, ScrubResult};

/// A period of scroll progress during which one overlay is visible.
///
/// `range = [start, end]` bounds visibility; `peak = [peak_start, peak_end]` is the full-opacity
/// plateau inside it. Static configuration, never mutated at runtime.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoryBeat {
    /// Overlay identifier.
    pub id: String,
    /// Visibility window `[start, end]`.
    pub range: [f64; 2],
    /// Full-opacity window `[peak_start, peak_end]`.
    pub peak: [f64; 2],
}

impl StoryBeat {
    /// Build a beat from its two windows.
    pub fn new(id: impl Into<String>, range: [f64; 2], peak: [f64; 2]) -> Self {
        Self {
            id: id.into(),
            range,
            peak,
        }
    }

    /// Visibility start.
    pub fn start(&self) -> f64 {
        self.range[0]
    }

    /// Visibility end.
    pub fn end(&self) -> f64 {
        self.range[1]
    }

    /// Plateau start.
    pub fn peak_start(&self) -> f64 {
        self.peak[0]
    }

    /// Plateau end.
    pub fn peak_end(&self) -> f64 {
        self.peak[1]
    }

    /// Require finite bounds with `0 <= start < end <= 1` and
    /// `start <= peak_start <= peak_end <= end`.
    pub fn validate(&self) -> ScrubResult<()> {
        let [start, end] = self.range;
        let [peak_start, peak_end] = self.peak;
        if [start, end, peak_start, peak_end]
            .iter()
            .any(|v| !v.is_finite())
        {
            return Err(ScrubError::validation(format!(
                "beat '{}' bounds must be finite",
                self.id
            )));
        }
        if !(0.0 <= start && start < end && end <= 1.0) {
            return Err(ScrubError::validation(format!(
                "beat '{}' range must satisfy 0 <= start < end <= 1",
                self.id
            )));
        }
        if !(start <= peak_start && peak_start <= peak_end && peak_end <= end) {
            return Err(ScrubError::validation(format!(
                "beat '{}' peak must lie inside its range with peak_start <= peak_end",
                self.id
            )));
        }
        Ok(())
    }
}

/// Validate every beat and require unique ids.
pub fn validate_beats(beats: &[StoryBeat]) -> ScrubResult<()> {
    let mut seen = HashSet::new();
    for beat in beats {
        beat.validate()?;
        if !seen.insert(beat.id.as_str()) {
            return Err(ScrubError::validation(format!(
                "duplicate beat id '{}'",
                beat.id
            )));
        }
    }
    Ok(())
}

/// The four beats of the product page: hero, precision, engineering, call to action.
pub fn default_beats() -> Vec<StoryBeat> {
    vec![
        StoryBeat::new("hero", [0.0, 0.2], [0.0, 0.14]),
        StoryBeat::new("precision", [0.2, 0.45], [0.26, 0.38]),
        StoryBeat::new("engineering", [0.48, 0.75], [0.55, 0.68]),
        StoryBeat::new("cta", [0.8, 1.0], [0.87, 1.0]),
    ]
}
