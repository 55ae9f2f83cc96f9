use std::sync::Arc;

use crate::{
    foundation::error::{ScrubError, ScrubResult},
    sequence::registry::{FrameSequence, SequenceRegistry},
};

/// Page-lifetime selection of the active sequence.
///
/// Owned by the page root and passed by reference: navigation writes through [`select`]/
/// [`select_id`], the player reads [`active`] and [`revision`] every time it is pumped. The
/// revision increments on every effective change, so readers compare revisions instead of caching
/// per-sequence values.
///
/// [`select`]: SequenceStore::select
/// [`select_id`]: SequenceStore::select_id
/// [`active`]: SequenceStore::active
/// [`revision`]: SequenceStore::revision
#[derive(Clone, Debug)]
pub struct SequenceStore {
    registry: SequenceRegistry,
    active: Arc<FrameSequence>,
    revision: u64,
}

impl SequenceStore {
    /// Start with the first registry entry selected.
    pub fn new(registry: SequenceRegistry) -> Self {
        let active = Arc::clone(registry.first());
        Self {
            registry,
            active,
            revision: 0,
        }
    }

    /// The catalog this store selects from.
    pub fn registry(&self) -> &SequenceRegistry {
        &self.registry
    }

    /// Currently active sequence.
    pub fn active(&self) -> &Arc<FrameSequence> {
        &self.active
    }

    /// Change counter; bumps only when the active sequence actually changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `id` is the active sequence.
    pub fn is_active(&self, id: u32) -> bool {
        self.active.id == id
    }

    /// Select a registry entry. Re-selecting the active sequence is a no-op and returns `false`.
    pub fn select(&mut self, sequence: &FrameSequence) -> ScrubResult<bool> {
        self.select_id(sequence.id)
    }

    /// Select by id. Fails for ids outside the registry, leaving the selection untouched.
    pub fn select_id(&mut self, id: u32) -> ScrubResult<bool> {
        let Some(next) = self.registry.get(id) else {
            return Err(ScrubError::validation(format!(
                "sequence {id} is not in the registry"
            )));
        };
        if self.active.id == id {
            return Ok(false);
        }
        tracing::debug!(from = self.active.id, to = id, "active sequence changed");
        self.active = Arc::clone(next);
        self.revision += 1;
        Ok(true)
    }
}
