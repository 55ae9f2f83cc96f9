//! Host-driven runtime.
//!
//! The engine performs no I/O of its own beyond loader work. The host supplies geometry and
//! refresh callbacks through [`host::Host`] and forwards them to a [`player::ScrollPlayer`].

/// Host services and the deterministic simulated host.
pub mod host;
/// Render loop controller.
pub mod player;
