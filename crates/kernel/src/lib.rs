//! Simulation kernel: the player controller, proximity triggers and the
//! teleport transition timer.
//!
//! # Invariants
//! - Player position never leaves the bounds it was updated with.
//! - Proximity pulse is 1 at a node, 0 at or beyond its radius.
//! - Discrete proximity state only advances; it resets on scene re-entry.
//! - Teleport timing reads wall-clock instants, never the simulation clock.

pub mod player;
pub mod proximity;
pub mod transition;

pub use player::Player;
pub use proximity::{
    Glow, NodeContent, NodeKind, NodeLink, PhaseTracker, ProximityEvent, ProximityTracker,
    RoomPhase, TriggerNode,
};
pub use transition::{TeleportTransition, TransitionPhase, TransitionStep};

pub fn crate_info() -> &'static str {
    "folio-kernel v0.1.0"
}
