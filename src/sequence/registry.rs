use std::{collections::HashSet, sync::Arc};

use crate::foundation::{
    core::FrameIndex,
    error::{ScrubError, ScrubResult},
};

const INDEX_PLACEHOLDER: &str = "{index}";

fn default_pad() -> usize {
    3
}

/// Pure mapping from a 0-based frame index to a resource locator.
///
/// The frame number substituted for `{index}` is `index + first`, zero-padded to `pad` digits.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PathTemplate {
    /// Locator pattern containing exactly one `{index}` placeholder.
    pub pattern: String,
    /// Frame-number offset of index 0 (exports often skip leading frames).
    #[serde(default)]
    pub first: usize,
    /// Zero-padding width of the substituted frame number.
    #[serde(default = "default_pad")]
    pub pad: usize,
}

impl PathTemplate {
    /// Build a template.
    pub fn new(pattern: impl Into<String>, first: usize, pad: usize) -> Self {
        Self {
            pattern: pattern.into(),
            first,
            pad,
        }
    }

    /// Render the locator for `index`. Does not range-check; see [`FrameSequence::path_for`].
    pub fn render(&self, index: usize) -> String {
        let number = format!("{:0width$}", index + self.first, width = self.pad);
        self.pattern.replacen(INDEX_PLACEHOLDER, &number, 1)
    }

    fn validate(&self) -> ScrubResult<()> {
        if self.pattern.trim().is_empty() {
            return Err(ScrubError::validation("path pattern must be non-empty"));
        }
        if self.pattern.matches(INDEX_PLACEHOLDER).count() != 1 {
            return Err(ScrubError::validation(format!(
                "path pattern '{}' must contain exactly one {INDEX_PLACEHOLDER} placeholder",
                self.pattern
            )));
        }
        Ok(())
    }
}

/// An ordered set of pre-rendered still frames.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSequence {
    /// Stable identifier used by navigation.
    pub id: u32,
    /// Display label.
    pub label: String,
    /// Number of frames, `>= 1`.
    pub count: usize,
    /// Locator template.
    pub path: PathTemplate,
}

impl FrameSequence {
    /// Build a sequence definition.
    pub fn new(id: u32, label: impl Into<String>, count: usize, path: PathTemplate) -> Self {
        Self {
            id,
            label: label.into(),
            count,
            path,
        }
    }

    /// Locator for `index`, failing when `index` is outside `[0, count)`.
    pub fn path_for(&self, index: FrameIndex) -> ScrubResult<String> {
        if index.0 >= self.count {
            return Err(ScrubError::validation(format!(
                "frame index {} out of range for sequence {} ({} frames)",
                index.0, self.id, self.count
            )));
        }
        Ok(self.path.render(index.0))
    }

    /// Every locator of the sequence, in frame order.
    pub fn locators(&self) -> impl Iterator<Item = (FrameIndex, String)> + '_ {
        (0..self.count).map(|i| (FrameIndex(i), self.path.render(i)))
    }

    /// Index of the final frame.
    pub fn last_index(&self) -> FrameIndex {
        FrameIndex(self.count.saturating_sub(1))
    }

    /// Check the definition is usable.
    pub fn validate(&self) -> ScrubResult<()> {
        if self.count == 0 {
            return Err(ScrubError::validation(format!(
                "sequence {} must have at least one frame",
                self.id
            )));
        }
        self.path.validate()
    }
}

/// Fixed, ordered catalog of the sequences a page offers.
#[derive(Clone, Debug)]
pub struct SequenceRegistry {
    sequences: Vec<Arc<FrameSequence>>,
}

impl SequenceRegistry {
    /// Validate and wrap `sequences`, keeping their display order.
    pub fn new(sequences: Vec<FrameSequence>) -> ScrubResult<Self> {
        if sequences.is_empty() {
            return Err(ScrubError::validation(
                "sequence registry must contain at least one sequence",
            ));
        }
        let mut seen = HashSet::new();
        for seq in &sequences {
            seq.validate()?;
            if !seen.insert(seq.id) {
                return Err(ScrubError::validation(format!(
                    "duplicate sequence id {}",
                    seq.id
                )));
            }
        }
        Ok(Self {
            sequences: sequences.into_iter().map(Arc::new).collect(),
        })
    }

    /// The catalog shipped with the product page.
    pub fn builtin() -> Self {
        Self {
            sequences: builtin_sequences().into_iter().map(Arc::new).collect(),
        }
    }

    /// All sequences in display order.
    pub fn list(&self) -> &[Arc<FrameSequence>] {
        &self.sequences
    }

    /// Lookup by id.
    pub fn get(&self, id: u32) -> Option<&Arc<FrameSequence>> {
        self.sequences.iter().find(|s| s.id == id)
    }

    /// First entry; the default selection.
    pub fn first(&self) -> &Arc<FrameSequence> {
        // `new` rejects empty catalogs.
        &self.sequences[0]
    }

    /// Locator for `index` in `sequence`.
    pub fn path_for(&self, sequence: &FrameSequence, index: FrameIndex) -> ScrubResult<String> {
        sequence.path_for(index)
    }

    /// Number of registered sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Always `false` for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// The six exports of the product rotation shipped with the page.
pub fn builtin_sequences() -> Vec<FrameSequence> {
    vec![
        FrameSequence::new(
            1,
            "Sequence 1",
            168,
            PathTemplate::new("/720-webp/frame_{index}_delay-0.043s.png", 15, 3),
        ),
        FrameSequence::new(
            2,
            "Sequence 2",
            35,
            PathTemplate::new("/720p-jpg/ezgif-frame-{index}.jpg", 6, 3),
        ),
        FrameSequence::new(
            3,
            "Sequence 3",
            239,
            PathTemplate::new("/720-upscale-jpg/ezgif-frame-{index}.jpg", 20, 3),
        ),
        FrameSequence::new(
            4,
            "Sequence 4",
            239,
            PathTemplate::new("/720-jpg-notupscaled/ezgif-frame-{index}.jpg", 20, 3),
        ),
        FrameSequence::new(
            5,
            "Sequence 5",
            192,
            PathTemplate::new("/1080p-webp-split/frame_{index}_delay-0.042s.png", 0, 3),
        ),
        FrameSequence::new(
            6,
            "Sequence 6",
            240,
            PathTemplate::new("/1080p-video-jpg/ezgif-frame-{index}.jpg", 1, 3),
        ),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/registry.rs"]
mod tests;
