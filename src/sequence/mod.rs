//! Frame sequence catalog and the navigation-facing selection store.

/// Sequence definitions, path templates and the registry.
pub mod registry;
/// Active-sequence store.
pub mod selection;
