/// Geometry and index primitives shared across the crate.
pub mod core;
/// Error type and result alias.
pub mod error;
